//! Browser capability trait
//!
//! The login flow only needs a handful of driver operations; anything that can
//! navigate, locate elements, type and click can drive it.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

use crate::core::Result;

/// Interval between presence checks in [`Browser::wait_for_element`]
const PRESENCE_POLL: Duration = Duration::from_millis(250);

/// Handle to the `index`-th element matching a selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    selector: String,
    index: usize,
}

impl ElementHandle {
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Locator addressing exactly this element
    pub fn locator(&self) -> String {
        format!("{} >> nth={}", self.selector, self.index)
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.selector, self.index)
    }
}

/// Trait for browser automation drivers
///
/// Calls may fail with `ElementNotFound` or `BrowserTimeout`; any other
/// failure is reported as a generic browser error.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// First element matching `selector`, if any
    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>>;

    /// Every element matching `selector`, possibly none
    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// Visible text of an element
    async fn text(&self, element: &ElementHandle) -> Result<String>;

    /// Empty an input element
    async fn clear(&self, element: &ElementHandle) -> Result<()>;

    /// Type into an element
    async fn send_keys(&self, element: &ElementHandle, keys: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> Result<()>;

    /// Location of the current page
    async fn current_url(&self) -> Result<String>;

    /// Poll for an element until it appears or `timeout` elapses
    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find_element(selector).await? {
                return Ok(Some(element));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(PRESENCE_POLL).await;
        }
    }

    /// Get the driver name
    fn name(&self) -> &str;
}
