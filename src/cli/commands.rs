//! CLI commands
//!
//! The work behind each binary subcommand.

use crate::browser::AgentBrowser;
use crate::cli::operator::OperatorClient;
use crate::core::{BridgeError, Config, LoginOutcome, Result};
use crate::login::LoginController;

/// Default operator URL for a listener configuration
pub fn local_endpoint_url(config: &Config) -> String {
    let host = match config.listener.host.as_str() {
        "0.0.0.0" | "::" | "" => "127.0.0.1",
        host => host,
    };
    format!("http://{}:{}", host, config.listener.port)
}

/// Run one login attempt with the agent-browser driver
pub async fn login(config: &Config) -> Result<LoginOutcome> {
    config.validate()?;

    if !AgentBrowser::is_available().await {
        return Err(BridgeError::AgentBrowserNotFound);
    }

    let browser = AgentBrowser::from_config(&config.browser);
    let mut controller = LoginController::from_config(browser, config);
    Ok(controller.start().await)
}

/// Confirm the endpoint is live, then submit the token
pub async fn submit_token(url: &str, token: &str) -> Result<String> {
    let client = OperatorClient::new(url);

    let status = client.status().await.map_err(|e| {
        BridgeError::with_context(format!("token endpoint at {} is not reachable", url), e)
    })?;
    tracing::info!(url, "Endpoint status: {}", status);

    client.submit(token).await
}

/// Probe the endpoint status
pub async fn status(url: &str) -> Result<String> {
    OperatorClient::new(url).status().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_endpoint_url() {
        let mut config = Config::default();
        config.listener.host = "0.0.0.0".to_string();
        config.listener.port = 8080;
        assert_eq!(local_endpoint_url(&config), "http://127.0.0.1:8080");

        config.listener.host = "10.0.0.5".to_string();
        assert_eq!(local_endpoint_url(&config), "http://10.0.0.5:8080");
    }

    #[tokio::test]
    async fn test_login_rejects_missing_credentials() {
        let config = Config::default();
        let err = login(&config).await.unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
