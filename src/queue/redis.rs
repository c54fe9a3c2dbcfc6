//! Redis-backed implementation of the queue client contract.
//!
//! Layout: one hash per job at `<queue>:job:<uuid>`, plus a pending list at
//! `<queue>:pending` (LPUSH/BRPOP, FIFO). Multi-key updates go through
//! atomic pipelines so a job is never visible on the list without its hash.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use redis::Commands;
use uuid::Uuid;

use super::job::{EnqueueOptions, Job, JobOutcome, JobStatus, OrderRequest};
use super::{FailureDisposition, JobQueue, QueueError};

pub struct RedisQueue {
    client: redis::Client,
    queue_name: String,
}

impl RedisQueue {
    /// Open a client against `url` and verify the server is reachable.
    pub fn connect(url: &str, queue_name: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_connection()?;
        redis::cmd("PING").query::<String>(&mut conn)?;
        log::info!("Connected to Redis, using queue \"{queue_name}\"");
        Ok(Self {
            client,
            queue_name: queue_name.to_string(),
        })
    }

    // A fresh connection per operation keeps the client safe for concurrent
    // callers; the worker's polling cadence makes the cost irrelevant.
    fn connection(&self) -> Result<redis::Connection, QueueError> {
        Ok(self.client.get_connection()?)
    }

    fn job_key(&self, job_id: Uuid) -> String {
        format!("{}:job:{}", self.queue_name, job_id)
    }

    fn pending_key(&self) -> String {
        format!("{}:pending", self.queue_name)
    }
}

impl JobQueue for RedisQueue {
    fn enqueue(
        &self,
        job_id: Uuid,
        payload: &OrderRequest,
        options: &EnqueueOptions,
    ) -> Result<(), QueueError> {
        let fields = [
            ("payload", serde_json::to_string(payload)?),
            ("status", JobStatus::Queued.as_str().to_string()),
            ("retries_left", options.retry.unwrap_or(0).to_string()),
            ("job_timeout", options.job_timeout.as_secs().to_string()),
            ("result_ttl", options.result_ttl.as_secs().to_string()),
            ("failure_ttl", options.failure_ttl.as_secs().to_string()),
            ("created_at", Utc::now().to_rfc3339()),
        ];
        let mut conn = self.connection()?;
        redis::pipe()
            .atomic()
            .hset_multiple(self.job_key(job_id), &fields)
            .ignore()
            .lpush(self.pending_key(), job_id.to_string())
            .ignore()
            .query::<()>(&mut conn)?;
        Ok(())
    }

    fn fetch_job(&self, job_id: Uuid) -> Result<Option<Job>, QueueError> {
        let mut conn = self.connection()?;
        let map: HashMap<String, String> = conn.hgetall(self.job_key(job_id))?;
        if map.is_empty() {
            return Ok(None);
        }
        job_from_map(job_id, &map).map(Some)
    }

    fn dequeue(&self, timeout: Duration) -> Result<Option<Job>, QueueError> {
        let mut conn = self.connection()?;
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(self.pending_key())
            .arg(timeout.as_secs().max(1))
            .query(&mut conn)?;
        let Some((_, raw_id)) = popped else {
            return Ok(None);
        };
        let job_id = raw_id
            .parse::<Uuid>()
            .map_err(|_| QueueError::Corrupt(raw_id.clone(), "queued id is not a UUID".into()))?;
        // The hash may have expired between push and pop; treat as no work.
        self.fetch_job(job_id)
    }

    fn mark_started(&self, job_id: Uuid) -> Result<(), QueueError> {
        let fields = [
            ("status", JobStatus::Started.as_str().to_string()),
            ("started_at", Utc::now().to_rfc3339()),
        ];
        let mut conn = self.connection()?;
        conn.hset_multiple::<_, _, _, ()>(self.job_key(job_id), &fields)?;
        Ok(())
    }

    fn record_success(&self, job: &Job, outcome: &JobOutcome) -> Result<(), QueueError> {
        let key = self.job_key(job.id);
        let fields = [
            ("status", JobStatus::Finished.as_str().to_string()),
            ("result", serde_json::to_string(outcome)?),
            ("ended_at", Utc::now().to_rfc3339()),
        ];
        let mut conn = self.connection()?;
        redis::pipe()
            .atomic()
            .hset_multiple(&key, &fields)
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(job.result_ttl.as_secs())
            .ignore()
            .query::<()>(&mut conn)?;
        Ok(())
    }

    fn record_failure(&self, job: &Job) -> Result<FailureDisposition, QueueError> {
        let key = self.job_key(job.id);
        let mut conn = self.connection()?;
        if job.retries_left > 0 {
            let remaining = job.retries_left - 1;
            let fields = [
                ("status", JobStatus::Queued.as_str().to_string()),
                ("retries_left", remaining.to_string()),
            ];
            redis::pipe()
                .atomic()
                .hset_multiple(&key, &fields)
                .ignore()
                .lpush(self.pending_key(), job.id.to_string())
                .ignore()
                .query::<()>(&mut conn)?;
            Ok(FailureDisposition::Retried { remaining })
        } else {
            let fields = [
                ("status", JobStatus::Failed.as_str().to_string()),
                ("ended_at", Utc::now().to_rfc3339()),
            ];
            redis::pipe()
                .atomic()
                .hset_multiple(&key, &fields)
                .ignore()
                .cmd("EXPIRE")
                .arg(&key)
                .arg(job.failure_ttl.as_secs())
                .ignore()
                .query::<()>(&mut conn)?;
            Ok(FailureDisposition::Failed)
        }
    }
}

// ── Hash decoding ────────────────────────────────────────────────────────────

fn required<'a>(
    job_id: Uuid,
    map: &'a HashMap<String, String>,
    field: &str,
) -> Result<&'a str, QueueError> {
    map.get(field)
        .map(String::as_str)
        .ok_or_else(|| QueueError::Corrupt(job_id.to_string(), format!("missing field {field}")))
}

fn parse_secs(job_id: Uuid, map: &HashMap<String, String>, field: &str) -> Result<Duration, QueueError> {
    let raw = required(job_id, map, field)?;
    raw.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| QueueError::Corrupt(job_id.to_string(), format!("{field} is not a number")))
}

fn parse_timestamp(job_id: Uuid, raw: &str, field: &str) -> Result<DateTime<Utc>, QueueError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| QueueError::Corrupt(job_id.to_string(), format!("{field} is not a timestamp")))
}

fn optional_timestamp(
    job_id: Uuid,
    map: &HashMap<String, String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, QueueError> {
    map.get(field)
        .map(|raw| parse_timestamp(job_id, raw, field))
        .transpose()
}

fn job_from_map(job_id: Uuid, map: &HashMap<String, String>) -> Result<Job, QueueError> {
    let payload: OrderRequest = serde_json::from_str(required(job_id, map, "payload")?)
        .map_err(|e| QueueError::Corrupt(job_id.to_string(), format!("payload is not valid JSON: {e}")))?;
    let status_raw = required(job_id, map, "status")?;
    let status = JobStatus::parse(status_raw).ok_or_else(|| {
        QueueError::Corrupt(job_id.to_string(), format!("unknown status \"{status_raw}\""))
    })?;
    let result: Option<JobOutcome> = map
        .get("result")
        .map(|raw| {
            serde_json::from_str(raw).map_err(|e| {
                QueueError::Corrupt(job_id.to_string(), format!("result is not valid JSON: {e}"))
            })
        })
        .transpose()?;
    let retries_left = required(job_id, map, "retries_left")?
        .parse::<u32>()
        .map_err(|_| QueueError::Corrupt(job_id.to_string(), "retries_left is not a number".into()))?;
    let created_at = parse_timestamp(job_id, required(job_id, map, "created_at")?, "created_at")?;

    Ok(Job {
        id: job_id,
        payload,
        status,
        result,
        retries_left,
        timeout: parse_secs(job_id, map, "job_timeout")?,
        result_ttl: parse_secs(job_id, map, "result_ttl")?,
        failure_ttl: parse_secs(job_id, map, "failure_ttl")?,
        created_at,
        started_at: optional_timestamp(job_id, map, "started_at")?,
        ended_at: optional_timestamp(job_id, map, "ended_at")?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use testcontainers::core::{ContainerPort, WaitFor};
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};
    use uuid::Uuid;

    use super::*;
    use crate::queue::ProcessingStatus;

    fn free_port() -> u16 {
        // Bind to port 0 to let the OS assign a free port, then release it.
        // There is a small TOCTOU window, but it is acceptable for test usage.
        std::net::TcpListener::bind("127.0.0.1:0")
            .expect("bind failed")
            .local_addr()
            .expect("addr failed")
            .port()
    }

    async fn setup_queue() -> (ContainerAsync<GenericImage>, RedisQueue) {
        let port = free_port();
        let container = GenericImage::new("redis", "7-alpine")
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .with_mapped_port(port, ContainerPort::Tcp(6379))
            .start()
            .await
            .expect("Failed to start Redis container");
        let queue = RedisQueue::connect(&format!("redis://127.0.0.1:{port}"), "orders_test")
            .expect("Failed to connect to Redis");
        (container, queue)
    }

    fn options(retry: Option<u32>) -> EnqueueOptions {
        EnqueueOptions {
            job_timeout: Duration::from_secs(60),
            result_ttl: Duration::from_secs(300),
            failure_ttl: Duration::from_secs(3600),
            retry,
        }
    }

    fn payload() -> OrderRequest {
        OrderRequest {
            user_name: "John Doe".to_string(),
            phone_number: "+375291111111".to_string(),
        }
    }

    #[tokio::test]
    async fn enqueue_then_fetch_reports_queued() {
        let (_container, queue) = setup_queue().await;
        let job_id = Uuid::new_v4();

        queue.enqueue(job_id, &payload(), &options(Some(3))).expect("enqueue failed");

        let job = queue.fetch_job(job_id).expect("fetch failed").expect("job missing");
        assert_eq!(job.id, job_id);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.payload.user_name, "John Doe");
        assert_eq!(job.retries_left, 3);
        assert_eq!(job.timeout, Duration::from_secs(60));
        assert!(job.result.is_none());
        assert!(job.started_at.is_none());
    }

    #[tokio::test]
    async fn fetch_unknown_job_returns_none() {
        let (_container, queue) = setup_queue().await;
        assert!(queue.fetch_job(Uuid::new_v4()).expect("fetch failed").is_none());
    }

    #[tokio::test]
    async fn dequeue_is_fifo() {
        let (_container, queue) = setup_queue().await;
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        queue.enqueue(first, &payload(), &options(None)).unwrap();
        queue.enqueue(second, &payload(), &options(None)).unwrap();

        let job = queue.dequeue(Duration::from_secs(1)).expect("dequeue failed").expect("no job");
        assert_eq!(job.id, first);
        let job = queue.dequeue(Duration::from_secs(1)).expect("dequeue failed").expect("no job");
        assert_eq!(job.id, second);
    }

    #[tokio::test]
    async fn dequeue_times_out_on_empty_queue() {
        let (_container, queue) = setup_queue().await;
        let job = queue.dequeue(Duration::from_secs(1)).expect("dequeue failed");
        assert!(job.is_none());
    }

    #[tokio::test]
    async fn success_records_result_and_ttl() {
        let (_container, queue) = setup_queue().await;
        let job_id = Uuid::new_v4();
        queue.enqueue(job_id, &payload(), &options(None)).unwrap();
        let job = queue.dequeue(Duration::from_secs(1)).unwrap().unwrap();

        queue.mark_started(job.id).expect("mark_started failed");
        let started = queue.fetch_job(job.id).unwrap().unwrap();
        assert_eq!(started.status, JobStatus::Started);
        assert!(started.started_at.is_some());

        queue
            .record_success(&job, &JobOutcome::accepted())
            .expect("record_success failed");
        let finished = queue.fetch_job(job.id).unwrap().unwrap();
        assert_eq!(finished.status, JobStatus::Finished);
        assert_eq!(finished.result.unwrap().status, ProcessingStatus::Accepted);
        assert!(finished.ended_at.is_some());

        let mut conn = queue.connection().unwrap();
        let ttl: i64 = redis::cmd("TTL").arg(queue.job_key(job.id)).query(&mut conn).unwrap();
        assert!(ttl > 0 && ttl <= 300, "unexpected result ttl {ttl}");
    }

    #[tokio::test]
    async fn failure_requeues_while_retries_remain() {
        let (_container, queue) = setup_queue().await;
        let job_id = Uuid::new_v4();
        queue.enqueue(job_id, &payload(), &options(Some(2))).unwrap();
        let job = queue.dequeue(Duration::from_secs(1)).unwrap().unwrap();

        let disposition = queue.record_failure(&job).expect("record_failure failed");
        assert_eq!(disposition, FailureDisposition::Retried { remaining: 1 });

        let requeued = queue.dequeue(Duration::from_secs(1)).unwrap().expect("job not requeued");
        assert_eq!(requeued.id, job_id);
        assert_eq!(requeued.retries_left, 1);
        assert_eq!(requeued.status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn failure_without_retries_is_terminal() {
        let (_container, queue) = setup_queue().await;
        let job_id = Uuid::new_v4();
        queue.enqueue(job_id, &payload(), &options(None)).unwrap();
        let job = queue.dequeue(Duration::from_secs(1)).unwrap().unwrap();

        let disposition = queue.record_failure(&job).expect("record_failure failed");
        assert_eq!(disposition, FailureDisposition::Failed);

        let failed = queue.fetch_job(job_id).unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert!(queue.dequeue(Duration::from_secs(1)).unwrap().is_none());

        let mut conn = queue.connection().unwrap();
        let ttl: i64 = redis::cmd("TTL").arg(queue.job_key(job_id)).query(&mut conn).unwrap();
        assert!(ttl > 0 && ttl <= 3600, "unexpected failure ttl {ttl}");
    }

    #[test]
    fn decoding_rejects_missing_status() {
        let job_id = Uuid::new_v4();
        let mut map = HashMap::new();
        map.insert("payload".to_string(), r#"{"user_name":"a","phone_number":"b"}"#.to_string());
        let err = job_from_map(job_id, &map).unwrap_err();
        assert!(matches!(err, QueueError::Corrupt(_, _)));
    }

    #[test]
    fn decoding_rejects_malformed_payload() {
        let job_id = Uuid::new_v4();
        let mut map = HashMap::new();
        map.insert("payload".to_string(), "not json".to_string());
        map.insert("status".to_string(), "queued".to_string());
        let err = job_from_map(job_id, &map).unwrap_err();
        assert!(matches!(err, QueueError::Corrupt(_, _)));
    }
}
