use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// API error type
///
/// Extender verdicts, including decode and predicate failures, travel inside
/// a 200 response body. This type covers the failures that have no place in
/// that body.
#[derive(Debug)]
pub enum ApiError {
    /// Unknown route (404)
    NotFound(String),

    /// The request was abandoned before a verdict was reached (503)
    ServiceUnavailable(String),

    /// Internal server error (500)
    Internal(String),
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "apiVersion": "v1",
            "kind": "Status",
            "status": "Failure",
            "message": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<lodestar_core::LodestarError> for ApiError {
    fn from(err: lodestar_core::LodestarError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<lodestar_scheduler::SchedulerError> for ApiError {
    fn from(err: lodestar_scheduler::SchedulerError) -> Self {
        use lodestar_scheduler::SchedulerError;

        match err {
            SchedulerError::Cancelled => ApiError::ServiceUnavailable(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("evaluation task failed: {}", err))
    }
}
