//! Output sink contracts

use crate::crawler::{DetailRow, SummaryEntry};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receives aggregated summary lines at the end of a run.
///
/// Entries are keyed by (date, region, broker, status); when a sink is given
/// several entries with the same key, the last one wins. Re-running a crawl
/// on the same day therefore refreshes quantities instead of duplicating
/// lines.
#[async_trait]
pub trait SummarySink {
    /// Writes the entries, returning the path of the produced artifact.
    async fn write_summary(&self, entries: &[SummaryEntry]) -> Result<PathBuf, OutputError>;
}

/// Receives deduplicated lead detail rows (full-capture mode only)
#[async_trait]
pub trait DetailSink {
    async fn write_details(&self, rows: &[DetailRow]) -> Result<PathBuf, OutputError>;
}

/// Latest-wins dedup by summary key, preserving first-observation order.
pub fn upsert_entries(entries: &[SummaryEntry]) -> Vec<SummaryEntry> {
    let mut order: Vec<(String, String, String, String)> = Vec::new();
    let mut latest: std::collections::HashMap<(String, String, String, String), SummaryEntry> =
        std::collections::HashMap::new();

    for entry in entries {
        let key = (
            entry.date.clone(),
            entry.region.clone(),
            entry.broker.clone(),
            entry.status.clone(),
        );
        if !latest.contains_key(&key) {
            order.push(key.clone());
        }
        latest.insert(key, entry.clone());
    }

    order
        .into_iter()
        .filter_map(|key| latest.remove(&key))
        .collect()
}
