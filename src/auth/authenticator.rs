//! Session authenticator
//!
//! Drives the browser page through the portal's login flow: credential
//! submission, then either OTP entry or out-of-band push approval, each with
//! its own bounded wait. The flow is a small explicit state machine; every
//! failure path is terminal and aborts the entire run. Login is never
//! retried automatically.

use crate::auth::state::SessionState;
use crate::config::{PortalConfig, TimeoutConfig};
use chromiumoxide::Page;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Marker present only inside the authenticated area
pub const AUTHENTICATED_MARKER: &str =
    r#"header .navbar, .sidebar, a[href*="sair"], #conteudo"#;

const EMAIL_INPUT: &str = "#email";
const PASSWORD_INPUT: &str = "#senha";
const OTP_INPUT: &str = "#chaveOtp";
const ERROR_INDICATOR: &str =
    ".alert-danger, .alert-error, .text-danger, .validation-error, [role=\"alert\"]";

/// Login failures; all terminal for the run
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Portal credentials are not configured")]
    MissingCredentials,

    #[error("Portal requires an OTP but none was provided")]
    OtpRequired,

    #[error("OTP was rejected (invalid or expired)")]
    OtpInvalid,

    #[error("Timed out waiting for login confirmation")]
    LoginTimeout,

    #[error("Browser error during login: {0}")]
    Browser(String),
}

/// Outcome of a bounded login poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    OtpInvalid,
    TimedOut,
}

/// One observation of the page during polling
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginProbe {
    /// Authenticated-area marker present
    pub authenticated: bool,
    /// Error indicator present
    pub error_visible: bool,
}

/// Polls `probe` until it reports an outcome or `max_wait` elapses.
///
/// Samples every `interval`. An error indication only counts when
/// `watch_errors` is set (the push-approval wait ignores stray alerts).
pub async fn poll_login_outcome<F, Fut>(
    probe: F,
    max_wait: Duration,
    interval: Duration,
    watch_errors: bool,
) -> Result<LoginOutcome, AuthError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<LoginProbe, AuthError>>,
{
    let deadline = Instant::now() + max_wait;

    loop {
        let observed = probe().await?;
        if observed.authenticated {
            return Ok(LoginOutcome::Authenticated);
        }
        if watch_errors && observed.error_visible {
            return Ok(LoginOutcome::OtpInvalid);
        }
        if Instant::now() >= deadline {
            return Ok(LoginOutcome::TimedOut);
        }
        tokio::time::sleep(interval).await;
    }
}

/// Drives a browser page through the portal login flow
pub struct SessionAuthenticator<'a> {
    page: &'a Page,
    timeouts: &'a TimeoutConfig,
    state: SessionState,
}

impl<'a> SessionAuthenticator<'a> {
    pub fn new(page: &'a Page, timeouts: &'a TimeoutConfig) -> Self {
        Self {
            page,
            timeouts,
            state: SessionState::Anonymous,
        }
    }

    /// Current position in the login flow
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the login flow against `entry_url`.
    ///
    /// Short-circuits when the session is already authenticated (persisted
    /// profile). `otp` overrides any standing OTP value in the config; it is
    /// only required when the portal actually presents the OTP input.
    pub async fn authenticate(
        &mut self,
        entry_url: &str,
        portal: &PortalConfig,
        otp: Option<&str>,
    ) -> Result<(), AuthError> {
        let result = self.login_flow(entry_url, portal, otp).await;
        match &result {
            Ok(()) => self.state.advance(SessionState::Authenticated),
            Err(_) => self.state.advance(SessionState::Failed),
        }
        result
    }

    async fn login_flow(
        &mut self,
        entry_url: &str,
        portal: &PortalConfig,
        otp: Option<&str>,
    ) -> Result<(), AuthError> {
        self.page
            .goto(entry_url)
            .await
            .map_err(|e| AuthError::Browser(e.to_string()))?;

        if self.element_exists(AUTHENTICATED_MARKER).await? {
            tracing::info!("Session already active, skipping login");
            return Ok(());
        }

        if self.element_exists(EMAIL_INPUT).await? {
            if portal.email.trim().is_empty() || portal.password.trim().is_empty() {
                return Err(AuthError::MissingCredentials);
            }

            tracing::info!("Submitting credentials");
            self.type_into(EMAIL_INPUT, &portal.email).await?;
            self.type_into(PASSWORD_INPUT, &portal.password).await?;
            self.submit(PASSWORD_INPUT).await?;
            self.state.advance(SessionState::CredentialsSubmitted);
        }

        if self.element_exists(OTP_INPUT).await? {
            let code = otp
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .or(portal.otp.as_deref().map(str::trim).filter(|s| !s.is_empty()))
                .ok_or(AuthError::OtpRequired)?;

            tracing::info!("Submitting OTP");
            self.type_into(OTP_INPUT, code).await?;
            self.submit(OTP_INPUT).await?;
            self.state.advance(SessionState::OtpPending);

            let outcome = poll_login_outcome(
                || self.probe(),
                self.timeouts.otp_wait(),
                self.timeouts.poll_interval(),
                true,
            )
            .await?;

            return match outcome {
                LoginOutcome::Authenticated => Ok(()),
                LoginOutcome::OtpInvalid => Err(AuthError::OtpInvalid),
                LoginOutcome::TimedOut => Err(AuthError::LoginTimeout),
            };
        }

        if !self.element_exists(AUTHENTICATED_MARKER).await? {
            // No OTP input and not yet inside: push-approval flow, confirmed
            // out-of-band and observed only through the marker.
            tracing::info!("Waiting for push approval");
            self.state.advance(SessionState::PushPending);

            let outcome = poll_login_outcome(
                || self.probe(),
                self.timeouts.push_wait(),
                self.timeouts.poll_interval(),
                false,
            )
            .await?;

            if outcome != LoginOutcome::Authenticated {
                return Err(AuthError::LoginTimeout);
            }
        }

        if self.element_exists(AUTHENTICATED_MARKER).await? {
            Ok(())
        } else {
            Err(AuthError::LoginTimeout)
        }
    }

    async fn probe(&self) -> Result<LoginProbe, AuthError> {
        Ok(LoginProbe {
            authenticated: self.element_exists(AUTHENTICATED_MARKER).await?,
            error_visible: self.element_exists(ERROR_INDICATOR).await?,
        })
    }

    async fn element_exists(&self, selector: &str) -> Result<bool, AuthError> {
        let expression = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector).map_err(|e| AuthError::Browser(e.to_string()))?
        );
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| AuthError::Browser(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| AuthError::Browser(e.to_string()))
    }

    async fn type_into(&self, selector: &str, value: &str) -> Result<(), AuthError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| AuthError::Browser(e.to_string()))?
            .click()
            .await
            .map_err(|e| AuthError::Browser(e.to_string()))?
            .type_str(value)
            .await
            .map_err(|e| AuthError::Browser(e.to_string()))?;
        Ok(())
    }

    /// Presses Enter in the given field and waits for the resulting
    /// navigation. A missing navigation event is not fatal; outcome
    /// detection is polling-based.
    async fn submit(&self, selector: &str) -> Result<(), AuthError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| AuthError::Browser(e.to_string()))?
            .press_key("Enter")
            .await
            .map_err(|e| AuthError::Browser(e.to_string()))?;

        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }
}
