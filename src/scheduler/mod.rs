//! Crawl job scheduling

pub mod job;
pub mod scheduler;

pub use job::{JobDescriptor, JobRequest, JobStatus};
pub use scheduler::{JobScheduler, QueuePosition, SchedulerConfig, SchedulerStatus};
