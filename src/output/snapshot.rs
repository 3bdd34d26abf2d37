//! JSON snapshots
//!
//! Alongside the CSVs, each run leaves a pretty-printed JSON snapshot of the
//! same data, for ad-hoc inspection and for diffing runs.

use crate::output::traits::OutputError;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `<prefix>-<stamp>.json` with the serialized value.
    pub async fn write<T: Serialize>(
        &self,
        prefix: &str,
        value: &T,
    ) -> Result<PathBuf, OutputError> {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = self.dir.join(format!("{}-{}.json", prefix, stamp));
        let body = serde_json::to_string_pretty(value)?;

        write_file(&path, &body).await?;
        tracing::debug!(path = %path.display(), "Wrote JSON snapshot");
        Ok(path)
    }
}

async fn write_file(path: &Path, content: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| OutputError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| OutputError::Io {
            path: path.display().to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::SummaryEntry;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_snapshot_round_trips() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path());

        let entries = vec![SummaryEntry {
            date: "2026-08-30".to_string(),
            region: "Campinas".to_string(),
            broker: "Maria Souza".to_string(),
            status: "Novo".to_string(),
            count: 3,
        }];

        let path = writer.write("resumo", &entries).await.unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(parsed[0]["broker"], "Maria Souza");
        assert_eq!(parsed[0]["count"], 3);
    }
}
