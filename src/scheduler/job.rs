//! Job records for the crawl scheduler

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a scheduled crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting in the queue
    Queued,
    /// Child process running
    Running,
    /// Child exited on its own (any code)
    Completed,
    /// Killed by the watchdog
    TimedOut,
    /// Could not be spawned or waited on
    Failed,
}

/// A request to run one crawl
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Human-readable label, used in logs and status output
    pub name: String,
    /// Extra arguments appended to the scheduler's base command
    pub args: Vec<String>,
}

/// A job as tracked by the scheduler
#[derive(Debug, Clone, Serialize)]
pub struct JobDescriptor {
    pub id: u64,
    pub name: String,
    pub args: Vec<String>,
    pub status: JobStatus,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

impl JobDescriptor {
    pub fn new(id: u64, request: JobRequest) -> Self {
        Self {
            id,
            name: request.name,
            args: request.args,
            status: JobStatus::Queued,
            enqueued_at: Utc::now(),
            started_at: None,
        }
    }
}
