//! Integration tests for run artifacts
//!
//! Drives the summary and detail sinks together against a temporary output
//! directory, the way a crawl run uses them.

use leadscope::crawler::{DetailRow, SummaryEntry};
use leadscope::output::{
    CsvDetailWriter, CsvSummaryWriter, DetailSink, SnapshotWriter, SummarySink,
};
use tempfile::TempDir;

fn entry(broker: &str, status: &str, count: u64) -> SummaryEntry {
    SummaryEntry {
        date: "2026-08-30".to_string(),
        region: "Campinas".to_string(),
        broker: broker.to_string(),
        status: status.to_string(),
        count,
    }
}

#[tokio::test]
async fn test_run_artifacts_land_in_output_dir() {
    let dir = TempDir::new().unwrap();

    let summary = vec![
        entry("Maria Souza", "Novo", 3),
        entry("Maria Souza", "Contatado", 1),
        entry("Jorge Lima", "Novo", 2),
    ];
    let details = vec![DetailRow {
        date: "2026-08-30".to_string(),
        region: "Campinas".to_string(),
        broker: "Maria Souza".to_string(),
        identity: "101".to_string(),
        name: "Ana Dias".to_string(),
        email: "ana@example.com".to_string(),
        phone: "+55 19 98888-0000".to_string(),
        product: "Residencial Aurora".to_string(),
        status: "Novo".to_string(),
    }];

    let summary_csv = CsvSummaryWriter::new(dir.path())
        .write_summary(&summary)
        .await
        .unwrap();
    let detail_csv = CsvDetailWriter::new(dir.path())
        .write_details(&details)
        .await
        .unwrap();
    let snapshot = SnapshotWriter::new(dir.path())
        .write("resumo", &summary)
        .await
        .unwrap();

    for path in [&summary_csv, &detail_csv, &snapshot] {
        assert!(path.exists());
        assert_eq!(path.parent().unwrap(), dir.path());
    }

    let csv = std::fs::read_to_string(&summary_csv).unwrap();
    assert!(csv.starts_with('\u{FEFF}'));
    assert_eq!(csv.lines().count(), 4); // header + 3 entries

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_summary_rewrite_refreshes_quantities() {
    let dir = TempDir::new().unwrap();
    let writer = CsvSummaryWriter::new(dir.path());

    // Same key twice within one run: the later quantity wins
    let path = writer
        .write_summary(&[entry("Maria Souza", "Novo", 3), entry("Maria Souza", "Novo", 7)])
        .await
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Maria Souza;Novo;7"));
    assert!(!content.contains("Maria Souza;Novo;3"));
}

#[tokio::test]
async fn test_missing_output_dir_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("saida").join("hoje");

    let path = CsvSummaryWriter::new(&nested)
        .write_summary(&[entry("Maria Souza", "Novo", 1)])
        .await
        .unwrap();

    assert!(path.exists());
    assert!(nested.exists());
}
