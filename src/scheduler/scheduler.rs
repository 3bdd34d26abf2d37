//! Single-concurrency job scheduler
//!
//! Runs crawl jobs as child processes, strictly one at a time, in arrival
//! order. A watchdog bounds each job's runtime; an expired job is killed and
//! recorded as timed out, and the queue advances. A job that fails to spawn
//! is recorded as failed without disturbing the scheduler itself.

use crate::scheduler::job::{JobDescriptor, JobRequest, JobStatus};
use chrono::Utc;
use serde::Serialize;
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Command template and watchdog for scheduled jobs
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Program to spawn for each job
    pub program: String,
    /// Arguments always passed before the job's own
    pub base_args: Vec<String>,
    /// Kill the child when it runs longer than this
    pub watchdog: Duration,
}

/// Queue positions reported by [`JobScheduler::enqueue`]
///
/// 0 means the job runs next (nothing ahead of it).
pub type QueuePosition = usize;

/// Terminal descriptors kept for inspection; older ones are dropped so a
/// long-lived scheduler does not grow without bound.
const FINISHED_HISTORY: usize = 32;

#[derive(Default)]
struct Inner {
    running: Option<JobDescriptor>,
    queue: VecDeque<JobDescriptor>,
    finished: Vec<JobDescriptor>,
    next_id: u64,
}

/// Point-in-time view of the scheduler
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: Option<JobDescriptor>,
    pub queued: Vec<JobDescriptor>,
}

/// FIFO, one-at-a-time crawl job runner
pub struct JobScheduler {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
    worker: JoinHandle<()>,
}

impl JobScheduler {
    /// Starts the scheduler's worker task.
    pub fn new(config: SchedulerConfig) -> Self {
        let inner = Arc::new(Mutex::new(Inner::default()));
        let notify = Arc::new(Notify::new());

        let worker = tokio::spawn(worker_loop(
            Arc::clone(&inner),
            Arc::clone(&notify),
            config,
        ));

        Self {
            inner,
            notify,
            worker,
        }
    }

    /// Adds a job to the queue, returning its position: the number of jobs
    /// (running included) ahead of it.
    pub fn enqueue(&self, request: JobRequest) -> QueuePosition {
        let mut inner = self.inner.lock().expect("scheduler lock poisoned");

        let id = inner.next_id;
        inner.next_id += 1;
        let descriptor = JobDescriptor::new(id, request);

        let position = inner.queue.len() + usize::from(inner.running.is_some());
        tracing::info!(job = %descriptor.name, id, position, "Enqueued crawl job");
        inner.queue.push_back(descriptor);
        drop(inner);

        self.notify.notify_one();
        position
    }

    pub fn status(&self) -> SchedulerStatus {
        let inner = self.inner.lock().expect("scheduler lock poisoned");
        SchedulerStatus {
            running: inner.running.clone(),
            queued: inner.queue.iter().cloned().collect(),
        }
    }

    /// Jobs that reached a terminal status, oldest first. Only the most
    /// recent descriptors are retained.
    pub fn finished(&self) -> Vec<JobDescriptor> {
        let inner = self.inner.lock().expect("scheduler lock poisoned");
        inner.finished.clone()
    }

    /// Stops the worker. Queued jobs are dropped; a running child keeps its
    /// kill-on-drop handle and dies with the worker.
    pub fn shutdown(self) {
        self.worker.abort();
    }
}

async fn worker_loop(inner: Arc<Mutex<Inner>>, notify: Arc<Notify>, config: SchedulerConfig) {
    loop {
        let next = {
            let mut guard = inner.lock().expect("scheduler lock poisoned");
            guard.queue.pop_front().map(|mut descriptor| {
                descriptor.status = JobStatus::Running;
                descriptor.started_at = Some(Utc::now());
                guard.running = Some(descriptor.clone());
                descriptor
            })
        };

        match next {
            Some(descriptor) => {
                tracing::info!(job = %descriptor.name, id = descriptor.id, "Starting crawl job");
                let status = run_one(&config, &descriptor).await;
                tracing::info!(job = %descriptor.name, id = descriptor.id, ?status, "Job finished");

                let mut guard = inner.lock().expect("scheduler lock poisoned");
                let mut done = guard.running.take().unwrap_or(descriptor);
                done.status = status;
                guard.finished.push(done);
                if guard.finished.len() > FINISHED_HISTORY {
                    guard.finished.remove(0);
                }
            }
            None => notify.notified().await,
        }
    }
}

async fn run_one(config: &SchedulerConfig, descriptor: &JobDescriptor) -> JobStatus {
    let mut command = Command::new(&config.program);
    command
        .args(&config.base_args)
        .args(&descriptor.args)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(job = %descriptor.name, "Failed to spawn job process: {}", e);
            return JobStatus::Failed;
        }
    };

    match tokio::time::timeout(config.watchdog, child.wait()).await {
        // Any exit clears the watchdog and counts as completion; the code is
        // recorded in the log, not in the status.
        Ok(Ok(exit)) => {
            if !exit.success() {
                tracing::warn!(job = %descriptor.name, ?exit, "Job exited non-zero");
            }
            JobStatus::Completed
        }
        Ok(Err(e)) => {
            tracing::error!(job = %descriptor.name, "Failed waiting on job process: {}", e);
            JobStatus::Failed
        }
        Err(_) => {
            tracing::warn!(
                job = %descriptor.name,
                watchdog_secs = config.watchdog.as_secs_f64(),
                "Watchdog expired, killing job"
            );
            if let Err(e) = child.start_kill() {
                tracing::error!(job = %descriptor.name, "Kill failed: {}", e);
            }
            let _ = child.wait().await;
            JobStatus::TimedOut
        }
    }
}
