//! Custom error types for checkpoint-bridge
//!
//! Provides a unified error handling system across all modules.

use std::time::Duration;

use thiserror::Error;

/// Main error type for login and token exchange operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// An expected UI element was absent
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The login outcome could not be determined within the detection bound
    #[error("Login outcome undetermined: {0}")]
    DetectionTimeout(String),

    /// No verification token was submitted before the deadline
    #[error("No verification token received within {0:?}")]
    TokenTimeout(Duration),

    /// A token was already accepted by this endpoint
    #[error("Verification token already received")]
    SubmissionConflict,

    /// The token request already ended; submissions are no longer accepted
    #[error("Verification token request has expired")]
    SubmissionClosed,

    /// Webhook delivery failed (never fatal)
    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// A browser operation hit its own internal wait bound
    #[error("Browser operation timed out: {0}")]
    BrowserTimeout(String),

    /// Agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// Token endpoint could not be started or stopped unexpectedly
    #[error("Token listener error: {0}")]
    Listener(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for checkpoint-bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Create an element-not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::ElementNotFound(what.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a listener error
    pub fn listener(msg: impl Into<String>) -> Self {
        Self::Listener(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Whether this error means "the element was not there"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound(_))
    }

    /// Whether this error came from a bounded wait running out
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::BrowserTimeout(_) | Self::DetectionTimeout(_) | Self::TokenTimeout(_)
        )
    }
}
