//! Run artifacts: CSV files and JSON snapshots

pub mod csv;
pub mod snapshot;
pub mod traits;

pub use csv::{escape_field, CsvDetailWriter, CsvSummaryWriter};
pub use snapshot::SnapshotWriter;
pub use traits::{upsert_entries, DetailSink, OutputError, SummarySink};
