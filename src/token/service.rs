//! Token exchange service
//!
//! Owns one short-lived endpoint per request: bind, announce, wait for a single
//! submission (or the deadline), tear the endpoint down, then hand back the token.
//! A service value is consumed by [`TokenExchangeService::listen`], and the
//! resulting [`PendingToken`] by [`PendingToken::wait`], so neither the slot nor
//! the listener can be reused across login attempts.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::core::config::ListenerConfig;
use crate::core::{BridgeError, Result};
use crate::token::endpoint::{self, SlotHandle, STATUS_PATH, TOKEN_PATH};

/// How long teardown waits for in-flight responses before aborting the server
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Ephemeral token endpoint factory
#[derive(Debug, Clone)]
pub struct TokenExchangeService {
    config: ListenerConfig,
}

impl TokenExchangeService {
    pub fn new(config: ListenerConfig) -> Self {
        Self { config }
    }

    /// Bind the endpoint and start serving it on a background task
    pub async fn listen(self) -> Result<PendingToken> {
        let addr = self.config.addr();
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|e| BridgeError::listener(format!("failed to bind {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| BridgeError::listener(format!("failed to read bound address: {}", e)))?;

        let (slot, signal) = SlotHandle::new();
        let app = endpoint::router(slot.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(err) = serve.await {
                tracing::error!(bind_addr = %local_addr, "token endpoint stopped: {}", err);
            }
        });

        tracing::debug!(bind_addr = %local_addr, "token endpoint listening");

        Ok(PendingToken {
            local_addr,
            slot,
            signal,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        })
    }

    /// Listen, announce, and wait for one token
    ///
    /// `None` waits indefinitely. The endpoint is stopped before this returns,
    /// whether a token arrived or not.
    pub async fn request(self, timeout: Option<Duration>) -> Result<String> {
        let pending = self.listen().await?;
        pending.announce();
        pending.wait(timeout).await
    }
}

/// A live endpoint waiting for its single submission
#[derive(Debug)]
pub struct PendingToken {
    local_addr: SocketAddr,
    slot: SlotHandle,
    signal: oneshot::Receiver<String>,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl PendingToken {
    /// Address the endpoint is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token accepted so far, if any
    pub fn received(&self) -> Option<String> {
        self.slot.received()
    }

    /// Print operator instructions to the console
    pub fn announce(&self) {
        println!("{}", instructions(self.local_addr));
        tracing::info!(
            bind_addr = %self.local_addr,
            "Waiting for verification token at {}{}",
            self.local_addr,
            TOKEN_PATH
        );
    }

    /// Block until a token arrives or `timeout` elapses, then stop the endpoint
    pub async fn wait(mut self, timeout: Option<Duration>) -> Result<String> {
        let received = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut self.signal).await {
                Ok(received) => Ok(received),
                // A submission that won the lock before the close still counts
                Err(_) => self
                    .slot
                    .close()
                    .map(Ok)
                    .ok_or(BridgeError::TokenTimeout(limit)),
            },
            None => Ok((&mut self.signal).await),
        };

        // Nothing submitted from here on can be accepted
        self.slot.close();
        self.shutdown().await;

        match received {
            Ok(Ok(token)) => Ok(token),
            Ok(Err(_)) => Err(BridgeError::listener(
                "endpoint stopped before a token arrived",
            )),
            Err(timeout) => {
                tracing::warn!("No verification token submitted in time");
                Err(timeout)
            }
        }
    }

    /// Stop accepting connections and wait until the listener is gone
    async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        let Some(mut server) = self.server.take() else {
            return;
        };

        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            tracing::warn!(bind_addr = %self.local_addr, "token endpoint slow to stop; aborting");
            server.abort();
            let _ = server.await;
        }

        tracing::debug!(bind_addr = %self.local_addr, "token endpoint stopped");
    }
}

impl Drop for PendingToken {
    fn drop(&mut self) {
        self.slot.close();
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}

fn instructions(addr: SocketAddr) -> String {
    format!(
        "\nA verification token was sent to the account owner.\n\
         Waiting for token submission at:\n    {addr}{TOKEN_PATH}\n\n\
         Submit a POST request to the {TOKEN_PATH} endpoint with the JSON payload:\n    \
         {{\"token\": \"<your_token_here>\"}}\n\n\
         GET {STATUS_PATH} confirms the endpoint is live.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ListenerConfig {
        ListenerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    #[test]
    fn test_instructions_mention_endpoint() {
        let text = instructions("127.0.0.1:8080".parse().unwrap());
        assert!(text.contains("127.0.0.1:8080/token"));
        assert!(text.contains(r#"{"token": "<your_token_here>"}"#));
    }

    #[tokio::test]
    async fn test_listen_binds_ephemeral_port() {
        let pending = TokenExchangeService::new(local_config())
            .listen()
            .await
            .unwrap();
        assert_ne!(pending.local_addr().port(), 0);
        assert!(pending.received().is_none());
    }

    #[tokio::test]
    async fn test_request_times_out() {
        let err = TokenExchangeService::new(local_config())
            .request(Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::TokenTimeout(_)));
    }
}
