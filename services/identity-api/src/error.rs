//! Error types for the Identity API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
///
/// Authentication failures are answered by `warden_axum::AuthRejection`;
/// this covers the service's own routes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Key set unavailable")]
    KeySetUnavailable(String),

    #[error("Not ready")]
    NotReady(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::KeySetUnavailable(_) | Self::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::KeySetUnavailable(_) => "KEY_SET_UNAVAILABLE",
            Self::NotReady(_) => "NOT_READY",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log the detail; the body only carries the generic message
        match &self {
            Self::KeySetUnavailable(reason) => {
                tracing::error!(reason = %reason, "Serving key set failed");
            }
            Self::NotReady(reason) => {
                tracing::warn!(reason = %reason, "Readiness check failed");
            }
            Self::NotFound => {}
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
