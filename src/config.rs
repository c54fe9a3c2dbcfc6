use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::queue::EnqueueOptions;

/// Runtime configuration, read from the environment. The binaries load a
/// `.env` file first via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub queue_name: String,
    pub job_timeout_secs: u64,
    pub job_result_ttl_secs: u64,
    pub job_failure_ttl_secs: u64,
    pub job_retry: bool,
    pub job_retry_count: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed_var("PORT", 8080),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            redis_url: env::var("REDIS_URL").expect("REDIS_URL must be set"),
            queue_name: env::var("QUEUE_NAME").unwrap_or_else(|_| "orders".to_string()),
            job_timeout_secs: parsed_var("JOB_TIMEOUT_SECS", 60),
            job_result_ttl_secs: parsed_var("JOB_RESULT_TTL_SECS", 300),
            job_failure_ttl_secs: parsed_var("JOB_FAILURE_TTL_SECS", 3600),
            job_retry: env::var("JOB_RETRY").map(|raw| parse_flag(&raw)).unwrap_or(false),
            job_retry_count: parsed_var("JOB_RETRY_COUNT", 3),
        }
    }

    /// The per-job knobs handed to the queue on every enqueue.
    pub fn enqueue_options(&self) -> EnqueueOptions {
        EnqueueOptions {
            job_timeout: Duration::from_secs(self.job_timeout_secs),
            result_ttl: Duration::from_secs(self.job_result_ttl_secs),
            failure_ttl: Duration::from_secs(self.job_failure_ttl_secs),
            retry: self.job_retry.then_some(self.job_retry_count),
        }
    }
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid number")),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw, "1" | "true" | "True" | "TRUE")
}
