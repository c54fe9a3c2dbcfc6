use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Order fields as submitted by the caller. Doubles as the HTTP request body
/// and the job payload; serde keeps the round-trip through the queue exact.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderRequest {
    pub user_name: String,
    pub phone_number: String,
}

/// Lifecycle state reported by the queue itself, distinct from the domain
/// status exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Deferred,
    Queued,
    Scheduled,
    Started,
    Canceled,
    Failed,
    Stopped,
    Finished,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Deferred => "deferred",
            JobStatus::Queued => "queued",
            JobStatus::Scheduled => "scheduled",
            JobStatus::Started => "started",
            JobStatus::Canceled => "canceled",
            JobStatus::Failed => "failed",
            JobStatus::Stopped => "stopped",
            JobStatus::Finished => "finished",
        }
    }

    pub fn parse(value: &str) -> Option<JobStatus> {
        match value {
            "created" => Some(JobStatus::Created),
            "deferred" => Some(JobStatus::Deferred),
            "queued" => Some(JobStatus::Queued),
            "scheduled" => Some(JobStatus::Scheduled),
            "started" => Some(JobStatus::Started),
            "canceled" => Some(JobStatus::Canceled),
            "failed" => Some(JobStatus::Failed),
            "stopped" => Some(JobStatus::Stopped),
            "finished" => Some(JobStatus::Finished),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing verdict returned by the task body and stored as the job result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub status: ProcessingStatus,
    pub detail: Option<String>,
}

impl JobOutcome {
    pub fn accepted() -> Self {
        Self {
            status: ProcessingStatus::Accepted,
            detail: None,
        }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            status: ProcessingStatus::Rejected,
            detail: Some(detail.into()),
        }
    }
}

/// Enqueue-time knobs carried on every job.
#[derive(Debug, Clone)]
pub struct EnqueueOptions {
    pub job_timeout: Duration,
    pub result_ttl: Duration,
    pub failure_ttl: Duration,
    /// Retry attempts on infrastructure failure; `None` disables retries.
    pub retry: Option<u32>,
}

/// One durable unit of queued work. The queue owns the job for its lifetime;
/// the worker borrows it for the duration of a single execution.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub payload: OrderRequest,
    pub status: JobStatus,
    pub result: Option<JobOutcome>,
    pub retries_left: u32,
    pub timeout: Duration,
    pub result_ttl: Duration,
    pub failure_ttl: Duration,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}
