//! CSV writers
//!
//! Spreadsheet-friendly CSV in the pt-BR convention: UTF-8 BOM so Excel
//! detects the encoding, `;` as the field delimiter. Fields containing the
//! delimiter, quotes, commas or newlines are quoted with embedded quotes
//! doubled.

use crate::crawler::{DetailRow, SummaryEntry};
use crate::output::traits::{upsert_entries, DetailSink, OutputError, SummarySink};
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};

const BOM: &str = "\u{FEFF}";
const DELIMITER: char = ';';

const SUMMARY_HEADER: [&str; 5] = ["Data", "Praca", "Corretor", "Situacao", "Quantidade"];
const DETAIL_HEADER: [&str; 9] = [
    "Data", "Praca", "Corretor", "Id", "Nome", "Email", "Telefone", "Produto", "Situacao",
];

/// Quotes a field when it contains characters that would break the record.
pub fn escape_field(field: &str) -> String {
    if field.contains(&['"', DELIMITER, ',', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn record(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// Splits one CSV record back into fields; inverse of [`record`].
#[cfg(test)]
pub fn parse_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.is_empty() {
            quoted = true;
        } else if c == DELIMITER {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}

fn build_document(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut out = String::from(BOM);
    out.push_str(&record(header));
    out.push('\n');
    for row in rows {
        let borrowed: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&record(&borrowed));
        out.push('\n');
    }
    out
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

fn stamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Writes `resumo-<stamp>.csv` files into the output directory
pub struct CsvSummaryWriter {
    dir: PathBuf,
}

impl CsvSummaryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SummarySink for CsvSummaryWriter {
    async fn write_summary(&self, entries: &[SummaryEntry]) -> Result<PathBuf, OutputError> {
        let rows = upsert_entries(entries)
            .into_iter()
            .map(|e| {
                vec![
                    e.date,
                    e.region,
                    e.broker,
                    e.status,
                    e.count.to_string(),
                ]
            })
            .collect();

        let path = self.dir.join(format!("resumo-{}.csv", stamp()));
        write_file(&path, &build_document(&SUMMARY_HEADER, rows)).await?;
        tracing::info!(path = %path.display(), lines = entries.len(), "Wrote summary CSV");
        Ok(path)
    }
}

/// Writes `leads-<stamp>.csv` files into the output directory
pub struct CsvDetailWriter {
    dir: PathBuf,
}

impl CsvDetailWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DetailSink for CsvDetailWriter {
    async fn write_details(&self, rows: &[DetailRow]) -> Result<PathBuf, OutputError> {
        let rows = rows
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.region.clone(),
                    r.broker.clone(),
                    r.identity.clone(),
                    r.name.clone(),
                    r.email.clone(),
                    r.phone.clone(),
                    r.product.clone(),
                    r.status.clone(),
                ]
            })
            .collect();

        let path = self.dir.join(format!("leads-{}.csv", stamp()));
        write_file(&path, &build_document(&DETAIL_HEADER, rows)).await?;
        tracing::info!(path = %path.display(), "Wrote detail CSV");
        Ok(path)
    }
}
