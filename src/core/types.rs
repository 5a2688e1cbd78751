//! Shared types used across checkpoint-bridge modules
//!
//! Contains login phases and outcomes, per-step results, and notification values.

use serde::{Deserialize, Serialize};

use crate::core::error::{BridgeError, Result};

/// Reason reported when submission lands neither on the landing area nor a checkpoint
pub const REASON_CREDENTIALS_REJECTED: &str = "credentials rejected or UI changed";

/// Reason reported when the verification step does not finish within the long bound
pub const REASON_VERIFICATION_TIMEOUT: &str = "verification not completed in time";

/// Phase of a single login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginPhase {
    Start,
    CredentialsEntered,
    Submitted,
    ChallengeDetected,
    AwaitingToken,
    TokenApplied,
    LoggedIn,
    LoginFailed,
}

impl LoginPhase {
    /// Whether the attempt has ended
    pub fn is_terminal(self) -> bool {
        matches!(self, LoginPhase::LoggedIn | LoginPhase::LoginFailed)
    }

    /// Whether `next` is a legal successor of this phase
    pub fn can_transition_to(self, next: LoginPhase) -> bool {
        use LoginPhase::*;

        match (self, next) {
            (Start, CredentialsEntered) => true,
            (CredentialsEntered, Submitted) => true,
            (Submitted, ChallengeDetected) => true,
            (ChallengeDetected, AwaitingToken) => true,
            (AwaitingToken, TokenApplied) => true,
            // Pre-check and the login page short-circuit both end straight from Start
            (Start, LoggedIn) => true,
            (Submitted | TokenApplied, LoggedIn) => true,
            (Submitted | AwaitingToken | TokenApplied, LoginFailed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for LoginPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoginPhase::Start => "start",
            LoginPhase::CredentialsEntered => "credentials_entered",
            LoginPhase::Submitted => "submitted",
            LoginPhase::ChallengeDetected => "challenge_detected",
            LoginPhase::AwaitingToken => "awaiting_token",
            LoginPhase::TokenApplied => "token_applied",
            LoginPhase::LoggedIn => "logged_in",
            LoginPhase::LoginFailed => "login_failed",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a login attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginOutcome {
    /// Attempt still in progress
    Pending,
    /// Session is authenticated
    LoggedIn,
    /// Attempt ended without authentication
    LoginFailed { reason: String },
}

impl LoginOutcome {
    /// Create a failure outcome
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::LoginFailed {
            reason: reason.into(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, LoginOutcome::LoggedIn)
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            LoginOutcome::LoginFailed { reason } => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginOutcome::Pending => write!(f, "pending"),
            LoginOutcome::LoggedIn => write!(f, "logged in"),
            LoginOutcome::LoginFailed { reason } => write!(f, "login failed: {}", reason),
        }
    }
}

/// Result of one best-effort UI step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    NotFound(String),
    TimedOut(String),
    Failed(String),
}

impl StepOutcome {
    /// Fold a browser call result into a step outcome
    pub fn from_result(result: Result<()>) -> Self {
        match result {
            Ok(()) => StepOutcome::Done,
            Err(BridgeError::ElementNotFound(what)) => StepOutcome::NotFound(what),
            Err(e) if e.is_timeout() => StepOutcome::TimedOut(e.to_string()),
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done)
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Done => write!(f, "done"),
            StepOutcome::NotFound(what) => write!(f, "not found: {}", what),
            StepOutcome::TimedOut(what) => write!(f, "timed out: {}", what),
            StepOutcome::Failed(what) => write!(f, "failed: {}", what),
        }
    }
}

/// Severity of a notification sent to humans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    RequestToken,
}

impl NotificationKind {
    /// Glyph prepended to the message text
    pub fn prefix(self) -> &'static str {
        match self {
            NotificationKind::Success => "✅",
            NotificationKind::Warning => "⚠️",
            NotificationKind::Error => "❌",
            NotificationKind::RequestToken => "🔐",
        }
    }

    /// Wire name used by the webhook payload
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::RequestToken => "request_token",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message handed to the notification collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub text: String,
    pub kind: NotificationKind,
}

impl NotificationMessage {
    pub fn new(text: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, NotificationKind::Success)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, NotificationKind::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, NotificationKind::Error)
    }

    pub fn request_token(text: impl Into<String>) -> Self {
        Self::new(text, NotificationKind::RequestToken)
    }

    /// Text with the severity glyph in front
    pub fn decorated(&self) -> String {
        format!("{} {}", self.kind.prefix(), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        use LoginPhase::*;

        assert!(Start.can_transition_to(CredentialsEntered));
        assert!(Submitted.can_transition_to(ChallengeDetected));
        assert!(TokenApplied.can_transition_to(LoggedIn));
        assert!(!LoggedIn.can_transition_to(Start));
        assert!(!LoginFailed.can_transition_to(LoggedIn));
        assert!(!Start.can_transition_to(TokenApplied));
    }

    #[test]
    fn test_terminal_phases() {
        assert!(LoginPhase::LoggedIn.is_terminal());
        assert!(LoginPhase::LoginFailed.is_terminal());
        assert!(!LoginPhase::AwaitingToken.is_terminal());
    }

    #[test]
    fn test_step_outcome_from_result() {
        assert_eq!(StepOutcome::from_result(Ok(())), StepOutcome::Done);
        assert_eq!(
            StepOutcome::from_result(Err(BridgeError::not_found("#username"))),
            StepOutcome::NotFound("#username".to_string())
        );
        assert!(matches!(
            StepOutcome::from_result(Err(BridgeError::BrowserTimeout("wait".into()))),
            StepOutcome::TimedOut(_)
        ));
        assert!(matches!(
            StepOutcome::from_result(Err(BridgeError::browser("crashed"))),
            StepOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_notification_decoration() {
        let msg = NotificationMessage::request_token("Please provide the code.");
        assert_eq!(msg.decorated(), "🔐 Please provide the code.");
        assert_eq!(msg.kind.as_str(), "request_token");
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(LoginOutcome::failed("nope")).unwrap();
        assert_eq!(json["status"], "login_failed");
        assert_eq!(json["reason"], "nope");
    }
}
