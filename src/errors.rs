use std::collections::HashMap;

use actix_web::HttpResponse;
use thiserror::Error;

use crate::queue::QueueError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Validation failed")]
    Validation(HashMap<String, String>),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<QueueError> for AppError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Connection(e) => AppError::ServiceUnavailable(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Validation(errors) => HttpResponse::BadRequest().json(serde_json::json!({
                "errors": errors
            })),
            AppError::ServiceUnavailable(_) => {
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "Service temporarily unavailable"
                }))
            }
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound.error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_returns_400() {
        let mut errors = HashMap::new();
        errors.insert("user_name".to_string(), "too short".to_string());
        let resp = AppError::Validation(errors).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_unavailable_returns_503() {
        let resp = AppError::ServiceUnavailable("redis down".to_string()).error_response();
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display() {
        assert_eq!(AppError::NotFound.to_string(), "Not found");
    }

    #[test]
    fn queue_connection_error_maps_to_service_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let app_err: AppError = QueueError::Connection(io.into()).into();
        assert!(matches!(app_err, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn queue_corrupt_error_maps_to_internal() {
        let app_err: AppError =
            QueueError::Corrupt("abc".to_string(), "bad data".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
