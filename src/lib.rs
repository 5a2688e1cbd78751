//! checkpoint-bridge - Browser login with human-in-the-loop verification
//!
//! Logs an automated browser session into a web property. When the site
//! interposes a verification checkpoint, the login pauses on a short-lived HTTP
//! endpoint until an operator submits the one-time token, then resumes.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Browser**: Browser capability trait with an agent-browser driver
//! - **Notify**: Fire-and-forget human notifications (webhook or no-op)
//! - **Token**: One-shot token endpoint bridged to the waiting login flow
//! - **Login**: Login session state and the controller state machine
//! - **CLI**: Subcommands and operator tooling
//!
//! # Usage
//!
//! ```rust,no_run
//! use checkpoint_bridge::browser::AgentBrowser;
//! use checkpoint_bridge::{Config, LoginController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let browser = AgentBrowser::from_config(&config.browser);
//!     let mut controller = LoginController::from_config(browser, &config);
//!
//!     let outcome = controller.start().await;
//!     println!("{}", outcome);
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod core;
pub mod login;
pub mod notify;
pub mod token;

// Re-export commonly used items
pub use crate::core::{BridgeError, Config, LoginOutcome, Result};
pub use login::LoginController;
pub use token::TokenExchangeService;
