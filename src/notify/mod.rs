//! Human notification module
//!
//! Notifications are fire-and-forget: delivery failures are logged by the
//! notifier and never reach the login flow.

mod webhook;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::config::NotifyConfig;
use crate::core::NotificationMessage;

pub use webhook::WebhookNotifier;

/// Trait for notification channels
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message on a best-effort basis
    async fn notify(&self, message: &NotificationMessage);

    /// Get the channel name
    fn name(&self) -> &str;
}

/// Notifier used when no destination is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, message: &NotificationMessage) {
        tracing::debug!(kind = %message.kind, "notification dropped (no webhook): {}", message.text);
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Build the notifier described by the configuration
pub fn from_config(config: &NotifyConfig) -> Arc<dyn Notifier> {
    match (&config.webhook_uri, &config.bot_id) {
        (Some(uri), Some(bot_id)) => Arc::new(WebhookNotifier::new(
            uri.clone(),
            bot_id.clone(),
            config.webhook_token.clone(),
        )),
        (None, None) => Arc::new(NoopNotifier),
        _ => {
            tracing::warn!("Webhook URI and bot id must both be set; notifications disabled");
            Arc::new(NoopNotifier)
        }
    }
}
