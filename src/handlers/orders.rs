use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::queue::{OrderRequest, RedisQueue};
use crate::service::OrderService;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
}

// ── Boundary checks ──────────────────────────────────────────────────────────

/// Field-length bounds enforced at the boundary, aggregated per field.
/// Content rules (character classes, numbering-plan validity) live in the
/// worker's validation pipeline.
fn validate_shape(body: &OrderRequest) -> Result<(), AppError> {
    let mut errors = HashMap::new();
    let name_len = body.user_name.trim().chars().count();
    if !(2..=128).contains(&name_len) {
        errors.insert(
            "user_name".to_string(),
            "must be between 2 and 128 characters".to_string(),
        );
    }
    let phone_len = body.phone_number.chars().count();
    if !(7..=28).contains(&phone_len) {
        errors.insert(
            "phone_number".to_string(),
            "must be between 7 and 28 characters".to_string(),
        );
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders/
///
/// Accepts the order for asynchronous processing and returns its id
/// immediately; poll the status endpoint for the outcome.
#[utoipa::path(
    post,
    path = "/orders/",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order accepted for processing", body = CreateOrderResponse),
        (status = 400, description = "Malformed order body"),
        (status = 503, description = "Queue unavailable"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService<RedisQueue>>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    validate_shape(&body)?;

    let id = web::block(move || service.create_order(&body))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /orders/{id}/status
///
/// Returns the current domain status derived from the job's queue state.
#[utoipa::path(
    get,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Current order status", body = crate::status::OrderStatusView),
        (status = 404, description = "Order not found"),
        (status = 503, description = "Queue unavailable"),
    ),
    tag = "orders"
)]
pub async fn get_order_status(
    service: web::Data<OrderService<RedisQueue>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let view = web::block(move || service.get_order_status(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(user_name: &str, phone_number: &str) -> OrderRequest {
        OrderRequest {
            user_name: user_name.to_string(),
            phone_number: phone_number.to_string(),
        }
    }

    #[test]
    fn accepts_in_bounds_fields() {
        assert!(validate_shape(&body("John Doe", "+375 29 111-11-11")).is_ok());
    }

    #[test]
    fn rejects_short_name_with_field_error() {
        let err = validate_shape(&body("J", "+375 29 111-11-11")).unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("user_name"));
        assert!(!errors.contains_key("phone_number"));
    }

    #[test]
    fn aggregates_errors_across_fields() {
        let err = validate_shape(&body("J", "123")).unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("user_name"));
        assert!(errors.contains_key("phone_number"));
    }

    #[test]
    fn rejects_overlong_phone() {
        let err = validate_shape(&body("John Doe", &"1".repeat(29))).unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("phone_number"));
    }
}
