//! Portal authentication
//!
//! One browser session per crawl run. [`BrowserSession`] launches Chromium
//! and owns the run's single page; [`SessionAuthenticator`] walks that page
//! through the portal's login flow (credentials, then OTP or push approval)
//! and exposes the resulting [`SessionState`]. After login the session hands
//! its cookies to the HTTP driver or keeps driving the page directly,
//! depending on the configured crawl mode.

pub mod authenticator;
pub mod browser;
pub mod state;

pub use authenticator::{
    poll_login_outcome, AuthError, LoginOutcome, LoginProbe, SessionAuthenticator,
    AUTHENTICATED_MARKER,
};
pub use browser::BrowserSession;
pub use state::SessionState;
