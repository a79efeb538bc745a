//! API error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use vigil_core::{DetectionError, TrackerError, ValidationError};

/// Error returned by any handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body was not valid JSON or had a field of the wrong type (400).
    #[error("malformed request body: {message}")]
    BadRequest {
        /// Parser message.
        message: String,
    },

    /// Agent record failed validation (400).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A stored agent could not be evaluated (500).
    #[error("{0}")]
    Detection(#[from] DetectionError),
}

impl ApiError {
    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Detection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Detection(_) => "DETECTION_FAILED",
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(e) => Self::Validation(e),
            TrackerError::Detection(e) => Self::Detection(e),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request(err.to_string())
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Detection(_) => tracing::error!(error = %self, "stored agents inconsistent with active mode"),
            _ => tracing::warn!(error = %self, "request rejected"),
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
