//! Webhook notifier
//!
//! Posts `{"bot_id", "message", "type"}` to a chat webhook.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::core::{BridgeError, NotificationMessage, Result};
use crate::notify::Notifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook request body
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    bot_id: &'a str,
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Notifier posting to an HTTP webhook
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    uri: String,
    bot_id: String,
    /// Sent verbatim as the Authorization header
    token: Option<String>,
}

impl WebhookNotifier {
    pub fn new(uri: impl Into<String>, bot_id: impl Into<String>, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            uri: uri.into(),
            bot_id: bot_id.into(),
            token,
        }
    }

    /// Deliver a message, reporting failures to the caller
    pub async fn try_send(&self, message: &NotificationMessage) -> Result<()> {
        let payload = WebhookPayload {
            bot_id: &self.bot_id,
            message: message.decorated(),
            kind: message.kind.as_str(),
        };

        let mut request = self.client.post(&self.uri).json(&payload);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::NotificationDelivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BridgeError::NotificationDelivery(format!(
                "webhook answered {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &NotificationMessage) {
        match self.try_send(message).await {
            Ok(()) => tracing::debug!(kind = %message.kind, "notification delivered"),
            Err(e) => tracing::warn!(kind = %message.kind, "{}", e),
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
