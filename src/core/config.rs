//! Configuration management for checkpoint-bridge
//!
//! Supports environment variables, config files, and runtime overrides.
//! Loaded once at process start and never mutated by the login flow.
//!
//! Config file location: ~/.config/checkpoint-bridge/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{BridgeError, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote property locations
    #[serde(default)]
    pub site: SiteConfig,
    /// DOM selectors used by the login flow
    #[serde(default)]
    pub selectors: SelectorConfig,
    /// Stored credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Token endpoint configuration
    #[serde(default)]
    pub listener: ListenerConfig,
    /// Wait bounds
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Webhook notification configuration
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Remote property configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Page holding the credential form
    pub login_url: String,
    /// Authenticated landing area
    pub landing_url: String,
    /// Path fragment identifying a verification checkpoint
    pub checkpoint_marker: String,
}

/// Selectors for the elements the login flow touches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub username: String,
    pub password: String,
    pub login_submit: String,
    /// Challenge input fields (zero or more may render)
    pub challenge_input: String,
    /// Challenge submit controls (zero or more may render)
    pub challenge_submit: String,
    /// Element that only renders for an authenticated session
    pub authenticated_marker: String,
    /// Expected text of the authenticated marker, compared case-insensitively
    pub authenticated_text: String,
    /// Fallback evidence of an authenticated session
    pub profile_marker: String,
}

/// Login credentials
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: String,
    /// Port number (default: 8080, 0 picks a free port)
    pub port: u16,
}

/// Wait bounds used by the login flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long the pre-check waits for the authenticated marker
    pub precheck_secs: u64,
    /// Short bound for classifying the result of submitting credentials
    pub detection_secs: u64,
    /// Long bound for reaching the landing area after a challenge
    pub verification_secs: u64,
    /// How long the token endpoint waits for an operator
    pub token_wait_secs: u64,
    /// Interval between location polls
    pub poll_interval_ms: u64,
}

/// Webhook notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_uri: Option<String>,
    pub bot_id: Option<String>,
    /// Sent verbatim as the Authorization header
    pub webhook_token: Option<String>,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: env::var("LOGIN_URL")
                .unwrap_or_else(|_| "https://www.linkedin.com/login".to_string()),
            landing_url: env::var("LANDING_URL")
                .unwrap_or_else(|_| "https://www.linkedin.com/feed/".to_string()),
            checkpoint_marker: "checkpoint".to_string(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            username: "#username".to_string(),
            password: "#password".to_string(),
            login_submit: r#"button[type="submit"]"#.to_string(),
            challenge_input: r#"input[autocomplete="one-time-code"]"#.to_string(),
            challenge_submit: r#"form button[type="submit"]"#.to_string(),
            authenticated_marker: r#"[data-session="active"]"#.to_string(),
            authenticated_text: "Start a post".to_string(),
            profile_marker: r#"img[alt*="Photo of"]"#.to_string(),
        }
    }
}

impl CredentialsConfig {
    /// Credentials from the environment
    pub fn from_env() -> Self {
        Self {
            email: env::var("LOGIN_EMAIL").unwrap_or_default(),
            password: env::var("LOGIN_PASSWORD").unwrap_or_default(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            precheck_secs: 3,
            detection_secs: 10,
            verification_secs: 300,
            token_wait_secs: 300,
            poll_interval_ms: 500,
        }
    }
}

impl NotifyConfig {
    /// Webhook settings from the environment
    pub fn from_env() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            webhook_uri: non_empty("WEBHOOK_URI"),
            bot_id: non_empty("BOT_ID"),
            webhook_token: non_empty("WEBHOOK_TOKEN"),
        }
    }

    /// Whether both a destination and a bot id are present
    pub fn is_configured(&self) -> bool {
        self.webhook_uri.is_some() && self.bot_id.is_some()
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("BRIDGE_BROWSER_SESSION")
                .unwrap_or_else(|_| "checkpoint-bridge".to_string()),
            headed: env::var("BRIDGE_BROWSER_HEADED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl TimeoutConfig {
    pub fn precheck(&self) -> Duration {
        Duration::from_secs(self.precheck_secs)
    }

    pub fn detection(&self) -> Duration {
        Duration::from_secs(self.detection_secs)
    }

    pub fn verification(&self) -> Duration {
        Duration::from_secs(self.verification_secs)
    }

    pub fn token_wait(&self) -> Duration {
        Duration::from_secs(self.token_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl ListenerConfig {
    /// Get the bind address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("checkpoint-bridge")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Configuration from the environment and defaults only
    pub fn from_env() -> Self {
        Self {
            credentials: CredentialsConfig::from_env(),
            notify: NotifyConfig::from_env(),
            ..Self::default()
        }
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let path = Self::config_file();
        if !path.exists() {
            return Self::from_env();
        }

        match Self::load_from_path(&path) {
            Ok(config) => config.overlay_env(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Ignoring config file: {}", e);
                Self::from_env()
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BridgeError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| BridgeError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BridgeError::config(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides on top of file values
    pub fn overlay_env(self) -> Self {
        self.overlay_with(|key| env::var(key).ok())
    }

    fn overlay_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(email) = var("LOGIN_EMAIL") {
            self.credentials.email = email;
        }
        if let Some(password) = var("LOGIN_PASSWORD") {
            self.credentials.password = password;
        }

        if let Some(host) = var("API_HOST") {
            self.listener.host = host;
        }
        if let Some(port) = var("API_PORT") {
            match port.trim().parse() {
                Ok(port) => self.listener.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid API_PORT"),
            }
        }

        self.notify.webhook_uri = var("WEBHOOK_URI").or(self.notify.webhook_uri);
        self.notify.bot_id = var("BOT_ID").or(self.notify.bot_id);
        self.notify.webhook_token = var("WEBHOOK_TOKEN").or(self.notify.webhook_token);
        self
    }

    /// Reject configurations a login attempt cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.credentials.email.trim().is_empty() {
            return Err(BridgeError::config("credentials.email is not set (LOGIN_EMAIL)"));
        }
        if self.credentials.password.is_empty() {
            return Err(BridgeError::config(
                "credentials.password is not set (LOGIN_PASSWORD)",
            ));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(BridgeError::config("timeouts.poll_interval_ms must be > 0"));
        }
        let landing = url::Url::parse(&self.site.landing_url)
            .map_err(|e| BridgeError::config(format!("site.landing_url is invalid: {}", e)))?;
        // A bare origin would classify every page on the host, login page included, as landed
        if landing.path().trim_matches('/').is_empty() {
            return Err(BridgeError::config(
                "site.landing_url must include a path below the site root",
            ));
        }
        Ok(())
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
