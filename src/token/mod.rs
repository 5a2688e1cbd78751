//! Token exchange module
//!
//! Bridges the login flow to a human operator: a one-shot HTTP endpoint whose
//! single accepted submission releases the waiting caller.

mod endpoint;
mod provider;
mod service;

pub use endpoint::{TokenSubmission, AWAITING_STATUS, STATUS_PATH, TOKEN_PATH};
pub use provider::{ListenerTokenProvider, TokenProvider};
pub use service::{PendingToken, TokenExchangeService};
