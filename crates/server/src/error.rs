//! Error types for the server and the derivation pipeline.

use crate::codec::CodecError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prism_storage::StorageError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Errors surfaced by non-image endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure while turning a request into a derivative.
///
/// Every variant ends in the error fallback redirect; redirects decided by
/// the pipeline are outcomes, not errors.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error(transparent)]
    Request(#[from] prism_core::Error),

    #[error("storage error for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl DeriveError {
    pub(crate) fn storage(key: &str, source: StorageError) -> Self {
        Self::Storage {
            key: key.to_string(),
            source,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(prism_core::Error::InvalidPath(_)) => "invalid_path",
            Self::Request(prism_core::Error::InvalidCommand(_)) => "invalid_command",
            Self::Storage {
                source: StorageError::NotFound(_),
                ..
            } => "source_not_found",
            Self::Storage { .. } => "storage",
            Self::Codec(_) => "codec",
        }
    }
}
