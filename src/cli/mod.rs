//! CLI module - subcommand implementations and operator tooling

pub mod commands;
pub mod operator;

pub use operator::OperatorClient;
