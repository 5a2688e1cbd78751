//! Login module - session tracking and the login state machine

pub mod controller;
pub mod session;

pub use controller::{classify_location, Location, LoginController};
pub use session::LoginSession;
