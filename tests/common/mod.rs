//! Shared test doubles for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use checkpoint_bridge::browser::{Browser, ElementHandle};
use checkpoint_bridge::core::{BridgeError, Config, NotificationMessage, Result};
use checkpoint_bridge::notify::Notifier;
use checkpoint_bridge::token::TokenProvider;

pub const LOGIN_URL: &str = "https://social.example/login";
pub const LANDING_URL: &str = "https://social.example/feed/";
pub const CHECKPOINT_URL: &str = "https://social.example/checkpoint/challenge/42";

/// Config pointing at the fake site
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.site.login_url = LOGIN_URL.to_string();
    config.site.landing_url = LANDING_URL.to_string();
    config.site.checkpoint_marker = "checkpoint".to_string();
    config.credentials.email = "bot@example.com".to_string();
    config.credentials.password = "hunter2".to_string();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config
}

/// A recorded browser interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    Clear(String),
    SendKeys(String, String),
    Click(String),
}

#[derive(Debug, Default)]
struct FakePage {
    url: String,
    /// Element texts per selector; the vector length is the match count
    elements: HashMap<String, Vec<String>>,
    /// Navigation target → resulting URL
    redirects: HashMap<String, String>,
    /// Clicked locator → resulting URL
    click_effects: HashMap<String, String>,
    /// Locators whose actions fail as stale
    broken: HashSet<String>,
    actions: Vec<Action>,
}

/// Scripted in-memory browser; clones share state
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    page: Arc<Mutex<FakePage>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements matching `selector`, one per text
    pub fn with_elements(self, selector: &str, texts: &[&str]) -> Self {
        self.page.lock().unwrap().elements.insert(
            selector.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_redirect(self, from: &str, to: &str) -> Self {
        self.page
            .lock()
            .unwrap()
            .redirects
            .insert(from.to_string(), to.to_string());
        self
    }

    /// Clicking the `index`-th match of `selector` moves to `url`
    pub fn with_click_effect(self, selector: &str, index: usize, url: &str) -> Self {
        let locator = ElementHandle::new(selector, index).locator();
        self.page
            .lock()
            .unwrap()
            .click_effects
            .insert(locator, url.to_string());
        self
    }

    /// Actions on the `index`-th match of `selector` fail
    pub fn with_broken(self, selector: &str, index: usize) -> Self {
        let locator = ElementHandle::new(selector, index).locator();
        self.page.lock().unwrap().broken.insert(locator);
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.page.lock().unwrap().actions.clone()
    }

    pub fn keys_sent_to(&self, selector: &str) -> Vec<(usize, String)> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::SendKeys(locator, keys) => {
                    parse_locator(&locator, selector).map(|index| (index, keys))
                }
                _ => None,
            })
            .collect()
    }

    pub fn clicks_on(&self, selector: &str) -> Vec<usize> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Click(locator) => parse_locator(&locator, selector),
                _ => None,
            })
            .collect()
    }

    /// Whether any credential typing or clicking happened
    pub fn touched_forms(&self) -> bool {
        self.actions()
            .iter()
            .any(|a| matches!(a, Action::SendKeys(..) | Action::Click(_) | Action::Clear(_)))
    }

    fn act(&self, element: &ElementHandle, action: Action) -> Result<()> {
        let mut page = self.page.lock().unwrap();
        let locator = element.locator();
        page.actions.push(action);
        if page.broken.contains(&locator) {
            return Err(BridgeError::not_found(locator));
        }
        let exists = page
            .elements
            .get(element.selector())
            .map(|texts| element.index() < texts.len())
            .unwrap_or(false);
        if !exists {
            return Err(BridgeError::not_found(locator));
        }
        Ok(())
    }
}

fn parse_locator(locator: &str, selector: &str) -> Option<usize> {
    locator
        .strip_prefix(selector)?
        .strip_prefix(" >> nth=")?
        .parse()
        .ok()
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut page = self.page.lock().unwrap();
        page.actions.push(Action::Navigate(url.to_string()));
        page.url = page
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self.find_elements(selector).await?.into_iter().next())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let page = self.page.lock().unwrap();
        let count = page.elements.get(selector).map(Vec::len).unwrap_or(0);
        Ok((0..count)
            .map(|index| ElementHandle::new(selector, index))
            .collect())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let page = self.page.lock().unwrap();
        page.elements
            .get(element.selector())
            .and_then(|texts| texts.get(element.index()))
            .cloned()
            .ok_or_else(|| BridgeError::not_found(element.locator()))
    }

    async fn clear(&self, element: &ElementHandle) -> Result<()> {
        self.act(element, Action::Clear(element.locator()))
    }

    async fn send_keys(&self, element: &ElementHandle, keys: &str) -> Result<()> {
        self.act(element, Action::SendKeys(element.locator(), keys.to_string()))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.act(element, Action::Click(element.locator()))?;
        let mut page = self.page.lock().unwrap();
        if let Some(url) = page.click_effects.get(&element.locator()).cloned() {
            page.url = url;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.lock().unwrap().url.clone())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Notifier that keeps every message
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<NotificationMessage>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &NotificationMessage) {
        self.messages.lock().unwrap().push(message.clone());
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Provider that answers with a fixed token, or times out when it has none
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
    calls: AtomicUsize,
}

impl StaticTokenProvider {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn obtain_token(&self, timeout: Option<Duration>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.token {
            Some(token) => Ok(token.clone()),
            None => {
                let limit = timeout.unwrap_or(Duration::from_secs(300));
                tokio::time::sleep(limit).await;
                Err(BridgeError::TokenTimeout(limit))
            }
        }
    }
}
