//! API error types and response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use strata_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request, invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BucketNotFound(name) => Self::NotFound(format!("bucket not found: {name}")),
            StoreError::ObjectNotFound { bucket, key } => {
                Self::NotFound(format!("object not found: {bucket}/{key}"))
            }
            StoreError::InvalidName(name) => Self::BadRequest(format!("invalid name: {name}")),
            StoreError::Io(e) => Self::Internal(e.to_string()),
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
            StoreError::Unavailable(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_api_statuses() {
        let not_found = ApiError::from(StoreError::ObjectNotFound {
            bucket: "gold".into(),
            key: "kpis.csv".into(),
        });
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let bad_request = ApiError::from(StoreError::InvalidName("a/b".into()));
        assert!(matches!(bad_request, ApiError::BadRequest(_)));

        let internal = ApiError::from(StoreError::Database("corrupt".into()));
        assert!(matches!(internal, ApiError::Internal(_)));
    }
}
