//! Worker: pulls jobs off the queue and executes them strictly sequentially.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use diesel::pg::PgConnection;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::processor::{process_order, JobContext};
use crate::queue::{FailureDisposition, Job, JobQueue, QueueError};

// Dequeue poll timeout; bounds how long shutdown takes to be observed.
const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("database connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Owns one database session for its operational lifetime and lends it to
/// each job's execution context. Horizontal throughput comes from running
/// more worker processes, each with its own session.
pub struct Worker<Q> {
    name: String,
    queue: Q,
    db: PgConnection,
}

impl<Q: JobQueue> Worker<Q> {
    /// Acquire a dedicated connection tagged with this worker's identity and
    /// bring the schema up to date.
    pub fn start(config: &Config, queue: Q) -> Result<Self, WorkerError> {
        let name = format!("{}.{}", std::process::id(), short_id());
        log::info!("Worker {name} starting up, initializing database session");
        let mut db =
            db::establish_connection(&config.database_url, &format!("order_worker_{name}"))?;
        crate::run_migrations(&mut db);
        Ok(Self { name, queue, db })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process jobs until the shutdown flag is set. Consumes the worker, so
    /// the database session is disposed on every exit path.
    pub fn run(mut self, shutdown: &AtomicBool) -> Result<(), WorkerError> {
        let outcome = self.run_loop(shutdown);
        log::info!(
            "Worker {} shutting down, database session disposed",
            self.name
        );
        outcome
    }

    fn run_loop(&mut self, shutdown: &AtomicBool) -> Result<(), WorkerError> {
        while !shutdown.load(Ordering::Relaxed) {
            let job = match self.queue.dequeue(DEQUEUE_TIMEOUT) {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(QueueError::Corrupt(job, reason)) => {
                    log::error!("Worker {}: skipping corrupt job {job}: {reason}", self.name);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            self.execute_job(job)?;
        }
        Ok(())
    }

    /// One job: mark started, run the task body against the worker's session,
    /// then record the outcome or engage retry accounting.
    fn execute_job(&mut self, job: Job) -> Result<(), QueueError> {
        log::info!("Worker {}: job {} started", self.name, job.id);
        self.queue.mark_started(job.id)?;
        let context = JobContext {
            job_id: job.id,
            db: &mut self.db,
        };
        match process_order(context, &job.payload) {
            Ok(outcome) => {
                log::info!(
                    "Worker {}: job {} finished with {:?}",
                    self.name,
                    job.id,
                    outcome.status
                );
                self.queue.record_success(&job, &outcome)
            }
            Err(e) => {
                log::error!(
                    "Worker {}: job {} raised an infrastructure fault: {e}",
                    self.name,
                    job.id
                );
                match self.queue.record_failure(&job)? {
                    FailureDisposition::Retried { remaining } => log::warn!(
                        "Worker {}: job {} requeued, {remaining} retries left",
                        self.name,
                        job.id
                    ),
                    FailureDisposition::Failed => {
                        log::warn!("Worker {}: job {} marked failed", self.name, job.id)
                    }
                }
                Ok(())
            }
        }
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
