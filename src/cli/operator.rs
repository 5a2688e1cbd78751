//! Operator tooling for the token endpoint
//!
//! Thin HTTP client used by whoever receives the verification code out of band.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::core::{BridgeError, Result};
use crate::token::{TokenSubmission, STATUS_PATH, TOKEN_PATH};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response body of the token endpoint
#[derive(Debug, Deserialize)]
struct EndpointReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a running token endpoint
#[derive(Debug, Clone)]
pub struct OperatorClient {
    client: Client,
    base_url: String,
}

impl OperatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the endpoint's status route
    pub async fn status(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, STATUS_PATH))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BridgeError::Other(format!(
                "token endpoint answered {}",
                response.status()
            )));
        }

        let reply: EndpointReply = response.json().await?;
        Ok(reply.status.unwrap_or_default())
    }

    /// Submit a token; a second submission reports `SubmissionConflict`, one
    /// arriving after the request ended reports `SubmissionClosed`
    pub async fn submit(&self, token: &str) -> Result<String> {
        let body = TokenSubmission {
            token: Some(token.to_string()),
        };
        let response = self
            .client
            .post(format!("{}{}", self.base_url, TOKEN_PATH))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let reply: EndpointReply = response.json().await?;

        match status {
            s if s.is_success() => Ok(reply.status.unwrap_or_default()),
            StatusCode::CONFLICT => Err(BridgeError::SubmissionConflict),
            StatusCode::GONE => Err(BridgeError::SubmissionClosed),
            _ => Err(BridgeError::Other(format!(
                "token rejected ({}): {}",
                status,
                reply.error.unwrap_or_default()
            ))),
        }
    }
}
