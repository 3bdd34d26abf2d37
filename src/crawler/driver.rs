//! PageDriver: the "fetch current page, discover next page" capability
//!
//! Two interchangeable back-ends implement this contract: an HTTP back-end
//! that re-fetches listing HTML with the authenticated session's cookies
//! (side-effect free per call), and a DOM back-end that drives the live
//! browser page (next-page is a click plus wait). The crawl loop awaits each
//! call before proceeding; there is never more than one page operation in
//! flight.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Errors raised by page drivers
///
/// Any of these is fatal for the current specialist's crawl; whether the run
/// continues with the remaining specialists is the caller's explicit policy.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Non-success HTTP status on a listing page
    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },

    /// Transport-level failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Browser/CDP failure in the DOM back-end
    #[error("Browser error: {0}")]
    Browser(String),

    /// The next-page reference could not be resolved against the current URL
    #[error("Unresolvable next-page reference '{href}' from {base}")]
    BadNextRef { href: String, base: String },

    /// `collect`/`next_page` called before `open`
    #[error("Driver has no open listing page")]
    NotOpen,
}

/// Capture mode for a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Grouping fields only; enough for summary counts
    Summary,
    /// Also extract email, phone and product for detail records
    Full,
}

impl CaptureMode {
    pub fn is_full(&self) -> bool {
        matches!(self, CaptureMode::Full)
    }
}

/// One raw extracted lead row
///
/// `identity` is the portal's native row id when present, otherwise a
/// composite of name, email and phone. `broker` and `status` are always
/// populated (they feed summary counts); detail fields are empty outside
/// full-capture mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRow {
    pub identity: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub product: String,
    pub broker: String,
    pub status: String,
}

/// Driver over one specialist's paginated listing
#[async_trait]
pub trait PageDriver: Send {
    /// Positions the driver at the first page of a listing.
    async fn open(&mut self, url: &Url) -> Result<(), DriveError>;

    /// Extracts the rows of the current page, in document order.
    async fn collect(&mut self, mode: CaptureMode) -> Result<Vec<LeadRow>, DriveError>;

    /// Advances to the next page. Returns `Ok(false)` when the current page
    /// has no next-page reference, which terminates the crawl loop.
    async fn next_page(&mut self) -> Result<bool, DriveError>;
}
