//! Crawl coordinator
//!
//! Walks one specialist's paginated listing through a [`PageDriver`],
//! deduplicates rows by identity across the whole listing, and aggregates
//! per-status counts. Pagination is bounded by the configured page cap so a
//! next-link cycle cannot hang a run.

use crate::config::Specialist;
use crate::crawler::driver::{CaptureMode, DriveError, LeadRow, PageDriver};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One aggregated summary line: distinct leads per status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub date: String,
    pub region: String,
    pub broker: String,
    pub status: String,
    pub count: u64,
}

/// One deduplicated lead with its crawl context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub date: String,
    pub region: String,
    pub broker: String,
    pub identity: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub product: String,
    pub status: String,
}

/// Result of crawling one specialist's listing
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Per-status counts, statuses in first-observation order
    pub summary: Vec<SummaryEntry>,

    /// Deduplicated leads; populated only in full-capture mode
    pub details: Option<Vec<DetailRow>>,

    /// Listing pages visited
    pub pages: u32,

    /// Distinct lead identities seen
    pub distinct: usize,
}

/// Crawls one specialist's listing end to end.
///
/// A lead appearing on several pages (the portal re-sorts between fetches)
/// is counted once, under the status of its first appearance. Visiting the
/// same listing twice without portal-side changes yields identical counts.
pub async fn crawl_specialist<D: PageDriver + ?Sized>(
    driver: &mut D,
    specialist: &Specialist,
    mode: CaptureMode,
    page_cap: u32,
    date: &str,
) -> Result<CrawlOutcome, DriveError> {
    let url = url::Url::parse(&specialist.listing_url).map_err(|_| DriveError::BadNextRef {
        href: specialist.listing_url.clone(),
        base: String::new(),
    })?;

    driver.open(&url).await?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut status_order: Vec<String> = Vec::new();
    let mut details: Vec<DetailRow> = Vec::new();
    let mut pages: u32 = 0;

    loop {
        pages += 1;
        let rows = driver.collect(mode).await?;
        let page_total = rows.len();
        let mut page_new = 0usize;

        for row in rows {
            if !seen.insert(row.identity.clone()) {
                continue;
            }
            page_new += 1;

            if !counts.contains_key(&row.status) {
                status_order.push(row.status.clone());
            }
            *counts.entry(row.status.clone()).or_insert(0) += 1;

            if mode.is_full() {
                details.push(detail_row(&row, specialist, date));
            }
        }

        tracing::info!(
            specialist = %specialist.name,
            page = pages,
            rows = page_total,
            new = page_new,
            "Collected listing page"
        );

        if pages >= page_cap {
            tracing::warn!(
                specialist = %specialist.name,
                page_cap,
                "Page cap reached, stopping pagination"
            );
            break;
        }

        if !driver.next_page().await? {
            break;
        }
    }

    let summary = status_order
        .iter()
        .map(|status| SummaryEntry {
            date: date.to_string(),
            region: specialist.region.clone(),
            broker: specialist.name.clone(),
            status: status.clone(),
            count: counts[status],
        })
        .collect();

    Ok(CrawlOutcome {
        summary,
        details: mode.is_full().then_some(details),
        pages,
        distinct: seen.len(),
    })
}

fn detail_row(row: &LeadRow, specialist: &Specialist, date: &str) -> DetailRow {
    let broker = if row.broker.is_empty() {
        specialist.name.clone()
    } else {
        row.broker.clone()
    };

    DetailRow {
        date: date.to_string(),
        region: specialist.region.clone(),
        broker,
        identity: row.identity.clone(),
        name: row.name.clone(),
        email: row.email.clone(),
        phone: row.phone.clone(),
        product: row.product.clone(),
        status: row.status.clone(),
    }
}
