//! One crawl run, end to end
//!
//! Launch the browser, log in once, then walk every configured specialist's
//! listing in order with a single page driver. Whether one specialist's
//! failure aborts the run or only skips that specialist is an explicit
//! configuration choice.

use crate::auth::{BrowserSession, SessionAuthenticator};
use crate::config::{Config, DriverMode, Specialist};
use crate::crawler::{
    crawl_specialist, CaptureMode, DetailRow, DomDriver, HttpDriver, PageDriver, SummaryEntry,
};
use crate::output::{
    CsvDetailWriter, CsvSummaryWriter, DetailSink, SnapshotWriter, SummarySink,
};
use crate::LeadscopeError;
use chrono::Local;
use std::collections::HashMap;
use std::path::PathBuf;

/// Per-run options from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// One-time OTP value, overriding any standing value in the config
    pub otp: Option<String>,
    /// Capture full detail rows in addition to the summary
    pub full: bool,
}

/// What a finished run produced
#[derive(Debug)]
pub struct RunReport {
    pub summary_csv: PathBuf,
    pub summary_json: PathBuf,
    pub detail_csv: Option<PathBuf>,
    pub detail_json: Option<PathBuf>,
    pub specialists_crawled: usize,
    pub specialists_failed: Vec<String>,
    pub distinct_leads: usize,
}

/// Runs a complete crawl for the given specialists.
pub async fn run_crawl(
    config: &Config,
    specialists: &[Specialist],
    options: &RunOptions,
) -> Result<RunReport, LeadscopeError> {
    if specialists.is_empty() {
        return Err(crate::ConfigError::NoSpecialists.into());
    }

    let session = BrowserSession::launch(&config.browser, config.timeouts.navigation()).await?;
    let result = crawl_with_session(&session, config, specialists, options).await;
    session.close().await;
    result
}

async fn crawl_with_session(
    session: &BrowserSession,
    config: &Config,
    specialists: &[Specialist],
    options: &RunOptions,
) -> Result<RunReport, LeadscopeError> {
    let entry_url = &specialists[0].listing_url;

    let mut authenticator = SessionAuthenticator::new(session.page(), &config.timeouts);
    authenticator
        .authenticate(entry_url, &config.portal, options.otp.as_deref())
        .await?;
    tracing::info!(state = %authenticator.state(), "Portal session established");

    let mut driver: Box<dyn PageDriver> = match config.crawl.mode {
        DriverMode::Http => {
            let cookie_header = session.cookie_header().await?;
            Box::new(
                HttpDriver::new(&config.crawl, config.timeouts.navigation(), cookie_header)
                    .map_err(|e| LeadscopeError::Http(e.to_string()))?,
            )
        }
        DriverMode::Dom => Box::new(DomDriver::new(session.page().clone())),
    };

    let mode = if options.full {
        CaptureMode::Full
    } else {
        CaptureMode::Summary
    };
    let date = Local::now().format("%Y-%m-%d").to_string();

    let mut summary: Vec<SummaryEntry> = Vec::new();
    let mut details: Vec<DetailRow> = Vec::new();
    let mut failed: Vec<String> = Vec::new();
    let mut distinct = 0usize;

    for specialist in specialists {
        tracing::info!(specialist = %specialist.name, region = %specialist.region, "Crawling listing");

        match crawl_specialist(&mut *driver, specialist, mode, config.crawl.page_cap, &date).await
        {
            Ok(outcome) => {
                tracing::info!(
                    specialist = %specialist.name,
                    pages = outcome.pages,
                    distinct = outcome.distinct,
                    "Listing crawled"
                );
                distinct += outcome.distinct;
                summary.extend(outcome.summary);
                if let Some(rows) = outcome.details {
                    details.extend(rows);
                }
            }
            Err(source) => {
                if config.crawl.continue_on_specialist_failure {
                    tracing::error!(
                        specialist = %specialist.name,
                        error = %source,
                        "Specialist crawl failed, continuing with the rest"
                    );
                    failed.push(specialist.name.clone());
                } else {
                    return Err(LeadscopeError::Crawl {
                        specialist: specialist.name.clone(),
                        source,
                    });
                }
            }
        }
    }

    log_status_totals(&summary);

    let dir = &config.output.dir;
    let snapshots = SnapshotWriter::new(dir);

    let summary_csv = CsvSummaryWriter::new(dir).write_summary(&summary).await?;
    let summary_json = snapshots.write("resumo", &summary).await?;

    let (detail_csv, detail_json) = if options.full {
        let csv = CsvDetailWriter::new(dir).write_details(&details).await?;
        let json = snapshots.write("leads", &details).await?;
        (Some(csv), Some(json))
    } else {
        (None, None)
    };

    Ok(RunReport {
        summary_csv,
        summary_json,
        detail_csv,
        detail_json,
        specialists_crawled: specialists.len() - failed.len(),
        specialists_failed: failed,
        distinct_leads: distinct,
    })
}

fn log_status_totals(summary: &[SummaryEntry]) {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for entry in summary {
        if !totals.contains_key(entry.status.as_str()) {
            order.push(&entry.status);
        }
        *totals.entry(&entry.status).or_insert(0) += entry.count;
    }

    for status in order {
        tracing::info!(status, count = totals[status], "Status total");
    }
}
