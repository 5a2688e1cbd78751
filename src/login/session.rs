//! Login session state
//!
//! Tracks the phase of one login attempt and its outcome. A session is created
//! when an attempt starts and discarded once it reaches a terminal phase.

use std::time::Duration;
use tokio::time::Instant;

use crate::core::{LoginOutcome, LoginPhase};

/// State of a single login attempt
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// Current phase
    phase: LoginPhase,
    /// When the attempt started
    started_at: Instant,
    /// Pending until a terminal phase is reached
    outcome: LoginOutcome,
    /// Every phase visited, in order
    history: Vec<LoginPhase>,
}

impl LoginSession {
    pub fn new() -> Self {
        Self {
            phase: LoginPhase::Start,
            started_at: Instant::now(),
            outcome: LoginOutcome::Pending,
            history: vec![LoginPhase::Start],
        }
    }

    pub fn phase(&self) -> LoginPhase {
        self.phase
    }

    pub fn outcome(&self) -> &LoginOutcome {
        &self.outcome
    }

    pub fn history(&self) -> &[LoginPhase] {
        &self.history
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Move to the next phase
    ///
    /// Transitions out of a terminal phase or outside the state graph are ignored.
    pub fn advance(&mut self, next: LoginPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::error!(from = %self.phase, to = %next, "illegal login phase transition ignored");
            return;
        }

        tracing::debug!(from = %self.phase, to = %next, "login phase");
        self.phase = next;
        self.history.push(next);
    }

    /// Finish as authenticated
    pub fn succeed(&mut self) {
        self.advance(LoginPhase::LoggedIn);
        if self.phase == LoginPhase::LoggedIn {
            self.outcome = LoginOutcome::LoggedIn;
        }
    }

    /// Finish as failed
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.advance(LoginPhase::LoginFailed);
        if self.phase == LoginPhase::LoginFailed {
            self.outcome = LoginOutcome::failed(reason);
        }
    }

    /// Final outcome; an unfinished session reports as failed
    pub fn into_outcome(self) -> LoginOutcome {
        match self.outcome {
            LoginOutcome::Pending => {
                LoginOutcome::failed(format!("login attempt stopped in phase {}", self.phase))
            }
            outcome => outcome,
        }
    }
}

impl Default for LoginSession {
    fn default() -> Self {
        Self::new()
    }
}
