//! Browser driver backed by the agent-browser CLI
//!
//! Every capability call shells out to `agent-browser` within a named session,
//! so the browser keeps its cookies between calls.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::browser::traits::{Browser, ElementHandle};
use crate::core::config::BrowserConfig;
use crate::core::{BridgeError, Result};

/// Driver for browser automation via agent-browser CLI
#[derive(Debug, Clone)]
pub struct AgentBrowser {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
}

impl AgentBrowser {
    /// Create a new driver bound to a session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            headed: false,
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        let mut browser = Self::new(config.session_name.clone());
        browser.set_headed(config.headed);
        browser
    }

    /// Set headed mode
    pub fn set_headed(&mut self, headed: bool) {
        self.headed = headed;
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::trace!(session = %self.session_name, ?args, "agent-browser");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BridgeError::AgentBrowserNotFound
            } else {
                BridgeError::browser(format!("Failed to run agent-browser: {}", e))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(classify_failure(args, &stderr))
        }
    }
}

/// Map agent-browser stderr onto the capability's failure kinds
fn classify_failure(args: &[&str], stderr: &str) -> BridgeError {
    let lower = stderr.to_lowercase();
    let target = args.last().copied().unwrap_or_default();

    if lower.contains("timeout") || lower.contains("timed out") {
        BridgeError::BrowserTimeout(format!("{}: {}", target, stderr.trim()))
    } else if lower.contains("not found")
        || lower.contains("no element")
        || lower.contains("resolved to 0 elements")
    {
        BridgeError::not_found(target)
    } else {
        BridgeError::browser(format!("agent-browser command failed: {}", stderr.trim()))
    }
}

/// Parse the output of `get count`
fn parse_count(output: &str) -> Result<usize> {
    output
        .trim()
        .parse()
        .map_err(|_| BridgeError::browser(format!("unexpected element count: {:?}", output.trim())))
}

#[async_trait]
impl Browser for AgentBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.run_command(&["open", url]).await?;

        // Network idle is best effort; slow trackers must not fail navigation
        let _ = self.run_command(&["wait", "--load", "networkidle"]).await;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self.find_elements(selector).await?.into_iter().next())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let output = self.run_command(&["get", "count", selector]).await?;
        let count = parse_count(&output)?;
        Ok((0..count)
            .map(|index| ElementHandle::new(selector, index))
            .collect())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let locator = element.locator();
        self.run_command(&["get", "text", &locator])
            .await
            .map(|s| s.trim().to_string())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<()> {
        let locator = element.locator();
        self.run_command(&["fill", &locator, ""]).await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, keys: &str) -> Result<()> {
        let locator = element.locator();
        self.run_command(&["type", &locator, keys]).await?;
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let locator = element.locator();
        self.run_command(&["click", &locator]).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.run_command(&["get", "url"])
            .await
            .map(|s| s.trim().to_string())
    }

    fn name(&self) -> &str {
        "agent-browser"
    }
}

impl Default for AgentBrowser {
    fn default() -> Self {
        Self::new("checkpoint-bridge")
    }
}
