//! Universal error handling for the API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use image_store::lifecycle::LifecycleError;
use image_store::store::StoreError;

/// API error response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code,
                    message: message.into(),
                },
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert lifecycle errors to application errors
impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::QuotaExceeded { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "quota_exceeded",
                err.to_string(),
                false,
            ),
            LifecycleError::Unauthorized => Self::new(
                StatusCode::FORBIDDEN,
                "unauthorized",
                err.to_string(),
                false,
            ),
            LifecycleError::Store(store_err) => store_err.into(),
        }
    }
}

/// Convert store errors to application errors
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::FileTooLarge { .. } => Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                err.to_string(),
                false,
            ),
            StoreError::InvalidTtl { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_ttl",
                err.to_string(),
                false,
            ),
            StoreError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "not_found", err.to_string(), false)
            }
            StoreError::Record(_) | StoreError::Io(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
                true,
            ),
        }
    }
}
