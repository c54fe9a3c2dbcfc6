use dotenvy::dotenv;
use order_intake::config::Config;
use order_intake::queue::RedisQueue;
use order_intake::service::OrderService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let queue = RedisQueue::connect(&config.redis_url, &config.queue_name)
        .expect("Failed to connect to Redis");
    let service = OrderService::new(queue, config.enqueue_options());

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    order_intake::build_server(service, &config.host, config.port)?.await
}
