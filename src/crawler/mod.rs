//! Listing crawl engine
//!
//! The crawl is split into three layers:
//!
//! - [`extract`]: the pure HTML ruleset shared by both back-ends;
//! - [`driver`]: the [`PageDriver`] contract plus its HTTP and DOM back-ends;
//! - [`coordinator`]: the pagination loop with dedup and aggregation.
//!
//! ```no_run
//! use leadscope::config::Specialist;
//! use leadscope::crawler::{crawl_specialist, CaptureMode, HttpDriver};
//!
//! # async fn run(mut driver: HttpDriver, specialist: Specialist) -> anyhow::Result<()> {
//! let outcome =
//!     crawl_specialist(&mut driver, &specialist, CaptureMode::Summary, 500, "2026-08-30")
//!         .await?;
//! for entry in &outcome.summary {
//!     println!("{}: {}", entry.status, entry.count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod dom_driver;
pub mod driver;
pub mod extract;
pub mod http_driver;

pub use coordinator::{crawl_specialist, CrawlOutcome, DetailRow, SummaryEntry};
pub use dom_driver::DomDriver;
pub use driver::{CaptureMode, DriveError, LeadRow, PageDriver};
pub use extract::{find_next_href, matches_next_vocab, parse_listing, ListingPage};
pub use http_driver::{build_http_client, HttpDriver};
