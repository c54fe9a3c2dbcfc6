use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dotenvy::dotenv;
use order_intake::config::Config;
use order_intake::queue::RedisQueue;
use order_intake::worker::Worker;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let queue = RedisQueue::connect(&config.redis_url, &config.queue_name)
        .expect("Failed to connect to Redis");
    let worker = Worker::start(&config, queue).expect("Failed to start worker");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Shutdown signal received");
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    let result = tokio::task::spawn_blocking(move || worker.run(&shutdown))
        .await
        .expect("Worker thread panicked");
    if let Err(e) = result {
        log::error!("Worker exited with error: {e}");
        std::process::exit(1);
    }
}
