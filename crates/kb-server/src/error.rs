//! API error types with JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kb_core::{DocumentError, StorageError};
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Document service error.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Document(e) => match e {
                DocumentError::Validation(_) => "VALIDATION_ERROR",
                DocumentError::NotFound(_) | DocumentError::VersionNotFound { .. } => "NOT_FOUND",
                DocumentError::PermissionDenied { .. } => "FORBIDDEN",
                DocumentError::Storage(StorageError::Conflict(_)) => "CONFLICT",
                DocumentError::Storage(_) => "STORAGE_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Document(e) => match e {
                DocumentError::Validation(_) => StatusCode::BAD_REQUEST,
                DocumentError::NotFound(_) | DocumentError::VersionNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                DocumentError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                DocumentError::Storage(StorageError::Conflict(_)) => StatusCode::CONFLICT,
                DocumentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
