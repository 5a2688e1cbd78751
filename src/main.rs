//! checkpoint-bridge - Browser login with human-in-the-loop verification
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use checkpoint_bridge::cli::commands;
use checkpoint_bridge::{Config, LoginOutcome};

/// checkpoint-bridge - Browser login with human-in-the-loop verification
#[derive(Parser, Debug)]
#[command(name = "checkpoint-bridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.config/checkpoint-bridge/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in, pausing for a verification token if the site asks for one
    Login {
        /// Token endpoint port
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// Run in headed browser mode (visible window)
        #[arg(long)]
        headed: bool,

        /// Browser session name
        #[arg(long)]
        session: Option<String>,
    },

    /// Submit a verification token to a waiting login
    SubmitToken {
        /// The one-time token
        token: String,

        /// Endpoint base URL (default: local listener)
        #[arg(long)]
        url: Option<String>,
    },

    /// Check whether a login is waiting for a token
    Status {
        /// Endpoint base URL (default: local listener)
        #[arg(long)]
        url: Option<String>,
    },

    /// Print the default configuration
    Config,
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let _ = dotenvy::dotenv();
            Ok(Config::load_from_path(path)?.overlay_env())
        }
        None => Ok(Config::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let mut config = load_config(args.config.as_ref())?;

    match args.command.unwrap_or(Command::Login {
        port: None,
        headed: false,
        session: None,
    }) {
        Command::Login {
            port,
            headed,
            session,
        } => {
            // Apply CLI overrides
            if let Some(port) = port {
                config.listener.port = port;
            }
            if headed {
                config.browser.headed = true;
            }
            if let Some(session) = session {
                config.browser.session_name = session;
            }

            match commands::login(&config).await? {
                LoginOutcome::LoginFailed { reason } => anyhow::bail!("Login failed: {}", reason),
                outcome => println!("{}", outcome),
            }
        }

        Command::SubmitToken { token, url } => {
            let url = url.unwrap_or_else(|| commands::local_endpoint_url(&config));
            let reply = commands::submit_token(&url, &token).await?;
            println!("{}", reply);
        }

        Command::Status { url } => {
            let url = url.unwrap_or_else(|| commands::local_endpoint_url(&config));
            let status = commands::status(&url).await?;
            println!("{}", status);
        }

        Command::Config => {
            println!("{}", Config::default_config_toml());
        }
    }

    Ok(())
}
