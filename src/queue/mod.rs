//! Durable work queue, used through its client contract.
//!
//! The broker itself (Redis) is an external collaborator; this module wraps
//! its commands into the operations the service and worker need: enqueue,
//! fetch-by-id, dequeue, and result/failure bookkeeping with retry and TTL
//! accounting.

pub mod job;
pub mod redis;

pub use self::job::{EnqueueOptions, Job, JobOutcome, JobStatus, OrderRequest, ProcessingStatus};
pub use self::redis::RedisQueue;

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue connection error: {0}")]
    Connection(#[from] ::redis::RedisError),
    #[error("job serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt job data ({0}): {1}")]
    Corrupt(String, String),
}

/// What happened to a job whose execution raised an infrastructure fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Requeued for another attempt.
    Retried { remaining: u32 },
    /// Retries exhausted (or never configured); the job is terminally failed.
    Failed,
}

pub trait JobQueue: Send + Sync + 'static {
    /// Store the job and push it onto the pending list. Fire-and-forget from
    /// the caller's perspective; processing happens in a worker.
    fn enqueue(
        &self,
        job_id: Uuid,
        payload: &OrderRequest,
        options: &EnqueueOptions,
    ) -> Result<(), QueueError>;

    /// Look a job up by id. `None` means the queue has no trace of it.
    fn fetch_job(&self, job_id: Uuid) -> Result<Option<Job>, QueueError>;

    /// Block up to `timeout` for the next pending job.
    fn dequeue(&self, timeout: Duration) -> Result<Option<Job>, QueueError>;

    fn mark_started(&self, job_id: Uuid) -> Result<(), QueueError>;

    /// Record the task body's structured outcome and start the result TTL.
    fn record_success(&self, job: &Job, outcome: &JobOutcome) -> Result<(), QueueError>;

    /// Engage retry accounting: requeue while attempts remain, otherwise mark
    /// the job terminally failed and start the failure TTL.
    fn record_failure(&self, job: &Job) -> Result<FailureDisposition, QueueError>;
}
