pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod processor;
pub mod queue;
pub mod schema;
pub mod service;
pub mod status;
pub mod validation;
pub mod worker;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer};
use diesel::pg::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::json;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::queue::RedisQueue;
use crate::service::OrderService;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations on the given connection.
pub fn run_migrations(conn: &mut PgConnection) {
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::orders::create_order, handlers::orders::get_order_status),
    components(schemas(
        queue::OrderRequest,
        handlers::orders::CreateOrderResponse,
        status::OrderStatusView,
    )),
    tags((name = "orders", description = "Order submission and status polling"))
)]
struct ApiDoc;

/// Render body-deserialization failures in the same shape as the per-field
/// validation errors.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let detail = err.to_string();
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(json!({ "errors": { "body": detail } })),
    )
    .into()
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: OrderService<RedisQueue>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/{id}/status", web::get().to(handlers::orders::get_order_status)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
