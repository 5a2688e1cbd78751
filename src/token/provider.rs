//! Token source seam used by the login controller

use async_trait::async_trait;
use std::time::Duration;

use crate::core::config::ListenerConfig;
use crate::core::Result;
use crate::token::service::TokenExchangeService;

/// Anything that can produce a verification token within a bound
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Suspend until a token is available or `timeout` elapses
    async fn obtain_token(&self, timeout: Option<Duration>) -> Result<String>;
}

/// Provider that opens a fresh token endpoint for every call
#[derive(Debug, Clone)]
pub struct ListenerTokenProvider {
    config: ListenerConfig,
}

impl ListenerTokenProvider {
    pub fn new(config: ListenerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TokenProvider for ListenerTokenProvider {
    async fn obtain_token(&self, timeout: Option<Duration>) -> Result<String> {
        TokenExchangeService::new(self.config.clone())
            .request(timeout)
            .await
    }
}
