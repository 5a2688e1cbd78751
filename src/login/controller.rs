//! Login controller
//!
//! Drives one login attempt through the browser capability:
//! pre-check → credentials → submit → classify the resulting location, and when
//! a verification checkpoint appears, suspend on the token provider, apply the
//! token and wait for the landing area.
//!
//! UI steps are best effort. A missing field or button is logged and the flow
//! still proceeds to outcome detection, which then decides the result.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::browser::{Browser, ElementHandle};
use crate::core::config::{
    Config, CredentialsConfig, SelectorConfig, SiteConfig, TimeoutConfig,
};
use crate::core::{
    BridgeError, LoginOutcome, LoginPhase, NotificationMessage, Result, StepOutcome,
    REASON_CREDENTIALS_REJECTED, REASON_VERIFICATION_TIMEOUT,
};
use crate::login::session::LoginSession;
use crate::notify::{self, Notifier};
use crate::token::{ListenerTokenProvider, TokenProvider};

/// Pause between typing the token and pressing the submit controls
const TOKEN_SETTLE: Duration = Duration::from_millis(200);

/// Where the browser currently is, as far as the login flow cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Landing,
    Checkpoint,
    Other,
}

/// Classify a page URL against the configured site
pub fn classify_location(current: &str, site: &SiteConfig) -> Location {
    let Ok(current_url) = Url::parse(current) else {
        return if current.contains(&site.checkpoint_marker) {
            Location::Checkpoint
        } else {
            Location::Other
        };
    };

    if current_url.path().contains(&site.checkpoint_marker) {
        return Location::Checkpoint;
    }

    let Ok(landing) = Url::parse(&site.landing_url) else {
        return Location::Other;
    };

    let landing_path = landing.path().trim_end_matches('/');
    let path = current_url.path();
    let on_landing_path = landing_path.is_empty()
        || path == landing_path
        || path.starts_with(&format!("{}/", landing_path));

    if current_url.host_str() == landing.host_str() && on_landing_path {
        Location::Landing
    } else {
        Location::Other
    }
}

/// What happened while applying a token to the challenge form
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ChallengeReport {
    filled: usize,
    fill_failures: usize,
    clicked: usize,
    click_failures: usize,
}

/// Orchestrates a login attempt
pub struct LoginController<B: Browser> {
    browser: B,
    site: SiteConfig,
    selectors: SelectorConfig,
    credentials: CredentialsConfig,
    timeouts: TimeoutConfig,
    notifier: Arc<dyn Notifier>,
    tokens: Arc<dyn TokenProvider>,
}

impl<B: Browser> LoginController<B> {
    /// Create a controller with explicit collaborators
    pub fn new(
        browser: B,
        config: &Config,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            browser,
            site: config.site.clone(),
            selectors: config.selectors.clone(),
            credentials: config.credentials.clone(),
            timeouts: config.timeouts.clone(),
            notifier,
            tokens,
        }
    }

    /// Create a controller using the configured webhook and token endpoint
    pub fn from_config(browser: B, config: &Config) -> Self {
        let notifier = notify::from_config(&config.notify);
        let tokens = Arc::new(ListenerTokenProvider::new(config.listener.clone()));
        Self::new(browser, config, notifier, tokens)
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Run one login attempt to a terminal outcome
    ///
    /// Never returns [`LoginOutcome::Pending`]. An already-authenticated session
    /// returns `LoggedIn` without touching the credential form.
    pub async fn start(&mut self) -> LoginOutcome {
        let mut session = LoginSession::new();
        tracing::info!(browser = self.browser.name(), "Starting login");

        if self.is_logged_in().await {
            tracing::info!("Session already authenticated; skipping login");
            session.succeed();
            return session.into_outcome();
        }

        tracing::info!("Session not authenticated; proceeding with login");
        self.handle_login(&mut session).await;

        let elapsed = session.elapsed();
        let outcome = session.into_outcome();
        match &outcome {
            LoginOutcome::LoggedIn => tracing::info!(?elapsed, "Login completed"),
            LoginOutcome::LoginFailed { reason } => {
                tracing::error!(?elapsed, "Login failed: {}", reason)
            }
            LoginOutcome::Pending => {}
        }
        outcome
    }

    async fn handle_login(&self, session: &mut LoginSession) {
        tracing::info!(url = %self.site.login_url, "Navigating to login page");
        if let Err(e) = self.browser.navigate(&self.site.login_url).await {
            tracing::warn!("Could not open login page: {}", e);
        }

        if self.location().await == Location::Landing {
            tracing::debug!("Login page redirected to the landing area");
            session.succeed();
            return;
        }

        let step = self.enter_credentials().await;
        if !step.is_done() {
            tracing::error!("Credential entry incomplete ({}); continuing", step);
        }
        session.advance(LoginPhase::CredentialsEntered);

        let step = self.click_login_button().await;
        if !step.is_done() {
            tracing::error!("Login submit incomplete ({}); continuing", step);
        }
        session.advance(LoginPhase::Submitted);

        let detected = self
            .wait_for_location(self.timeouts.detection(), |l| l != Location::Other)
            .await;

        match detected {
            Some(Location::Landing) => session.succeed(),
            Some(Location::Checkpoint) => {
                session.advance(LoginPhase::ChallengeDetected);
                self.handle_challenge(session).await;
            }
            _ => {
                let err = BridgeError::DetectionTimeout(REASON_CREDENTIALS_REJECTED.to_string());
                tracing::warn!("{}", err);
                session.fail(REASON_CREDENTIALS_REJECTED);
            }
        }
    }

    async fn enter_credentials(&self) -> StepOutcome {
        StepOutcome::from_result(self.try_enter_credentials().await)
    }

    async fn try_enter_credentials(&self) -> Result<()> {
        let username = self
            .browser
            .wait_for_element(&self.selectors.username, self.timeouts.detection())
            .await?
            .ok_or_else(|| BridgeError::not_found(&self.selectors.username))?;
        self.browser.clear(&username).await?;
        self.browser
            .send_keys(&username, &self.credentials.email)
            .await?;

        let password = self
            .browser
            .find_element(&self.selectors.password)
            .await?
            .ok_or_else(|| BridgeError::not_found(&self.selectors.password))?;
        self.browser.clear(&password).await?;
        self.browser
            .send_keys(&password, &self.credentials.password)
            .await
    }

    async fn click_login_button(&self) -> StepOutcome {
        StepOutcome::from_result(self.try_click_login_button().await)
    }

    async fn try_click_login_button(&self) -> Result<()> {
        let button = self
            .browser
            .find_element(&self.selectors.login_submit)
            .await?
            .ok_or_else(|| BridgeError::not_found(&self.selectors.login_submit))?;
        self.browser.click(&button).await
    }

    async fn handle_challenge(&self, session: &mut LoginSession) {
        tracing::warn!("Verification checkpoint detected");
        self.notifier
            .notify(&NotificationMessage::request_token(
                "Please provide the verification code to continue.",
            ))
            .await;
        session.advance(LoginPhase::AwaitingToken);

        let token = match self
            .tokens
            .obtain_token(Some(self.timeouts.token_wait()))
            .await
        {
            Ok(token) => token,
            Err(BridgeError::TokenTimeout(limit)) => {
                tracing::error!(?limit, "No verification token submitted");
                self.report_failure(session, REASON_VERIFICATION_TIMEOUT)
                    .await;
                return;
            }
            Err(e) => {
                tracing::error!("Token exchange failed: {}", e);
                self.report_failure(session, format!("verification token unavailable: {}", e))
                    .await;
                return;
            }
        };

        let report = self.apply_token(&token).await;
        tracing::info!(?report, "Verification token applied");
        session.advance(LoginPhase::TokenApplied);

        let landed = self
            .wait_for_location(self.timeouts.verification(), |l| l == Location::Landing)
            .await;

        if landed.is_some() {
            tracing::info!("Verification completed");
            self.notifier
                .notify(&NotificationMessage::success("Login verification completed."))
                .await;
            session.succeed();
        } else {
            self.report_failure(session, REASON_VERIFICATION_TIMEOUT)
                .await;
        }
    }

    /// Type the token into every challenge field, then press every submit control
    async fn apply_token(&self, token: &str) -> ChallengeReport {
        let mut report = ChallengeReport::default();

        let inputs = self.find_all(&self.selectors.challenge_input).await;
        for (index, input) in inputs.iter().enumerate() {
            match self.browser.send_keys(input, token).await {
                Ok(()) => {
                    tracing::debug!(index, "Entered token into challenge input");
                    report.filled += 1;
                }
                Err(e) => {
                    tracing::warn!(index, "Could not enter token into challenge input: {}", e);
                    report.fill_failures += 1;
                }
            }
        }

        tokio::time::sleep(TOKEN_SETTLE).await;

        // Controls are all pressed even if an earlier one already advanced the page
        let controls = self.find_all(&self.selectors.challenge_submit).await;
        for (index, control) in controls.iter().enumerate() {
            match self.browser.click(control).await {
                Ok(()) => {
                    tracing::debug!(index, "Clicked challenge submit control");
                    report.clicked += 1;
                    if self.location().await == Location::Checkpoint {
                        tracing::debug!(index, "Still at checkpoint");
                    }
                }
                Err(e) => {
                    tracing::warn!(index, "Could not click challenge submit control: {}", e);
                    report.click_failures += 1;
                }
            }
        }

        report
    }

    async fn report_failure(&self, session: &mut LoginSession, reason: impl Into<String>) {
        let reason = reason.into();
        self.notifier
            .notify(&NotificationMessage::error(format!("Login failed: {}", reason)))
            .await;
        session.fail(reason);
    }

    /// Pre-check against the landing area
    async fn is_logged_in(&self) -> bool {
        tracing::debug!("Checking whether the session is already authenticated");
        if let Err(e) = self.browser.navigate(&self.site.landing_url).await {
            tracing::warn!("Could not open landing page: {}", e);
            return false;
        }

        match self
            .browser
            .wait_for_element(&self.selectors.authenticated_marker, self.timeouts.precheck())
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!("Authenticated marker did not appear");
                return false;
            }
            Err(e) => {
                tracing::debug!("Authenticated marker lookup failed: {}", e);
                return false;
            }
        }

        let expected = self.selectors.authenticated_text.trim().to_lowercase();
        let markers = self.find_all(&self.selectors.authenticated_marker).await;
        tracing::debug!(count = markers.len(), "Authenticated markers found");
        for marker in &markers {
            if let Ok(text) = self.browser.text(marker).await {
                if text.trim().to_lowercase() == expected {
                    tracing::info!("Authenticated marker text matched");
                    return true;
                }
            }
        }

        if !self.find_all(&self.selectors.profile_marker).await.is_empty() {
            tracing::info!("Profile marker found; assuming authenticated");
            return true;
        }

        tracing::info!("No authenticated markers matched");
        false
    }

    async fn find_all(&self, selector: &str) -> Vec<ElementHandle> {
        match self.browser.find_elements(selector).await {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!(selector, "Element lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn location(&self) -> Location {
        match self.browser.current_url().await {
            Ok(url) => classify_location(&url, &self.site),
            Err(e) => {
                tracing::debug!("Could not read current URL: {}", e);
                Location::Other
            }
        }
    }

    /// Poll the location until `accept` holds or `timeout` elapses
    async fn wait_for_location<F>(&self, timeout: Duration, accept: F) -> Option<Location>
    where
        F: Fn(Location) -> bool + Send,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let location = self.location().await;
            if accept(location) {
                return Some(location);
            }
            if Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(self.timeouts.poll_interval()).await;
        }
    }
}
