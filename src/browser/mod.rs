//! Browser automation module
//!
//! The capability the login flow drives, and its agent-browser implementation.

mod agent_browser;
mod traits;

pub use agent_browser::AgentBrowser;
pub use traits::{Browser, ElementHandle};
