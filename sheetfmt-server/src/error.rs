//! Request-level errors and their JSON/HTTP mapping.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use sheetfmt_core::SheetfmtError;
use thiserror::Error;

/// Everything a request can fail with. Each variant owns its status code and message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request must be JSON")]
    NotJson { content_type: Option<String> },

    #[error("Request body is not valid JSON")]
    InvalidJson,

    #[error("Missing file or filename in payload")]
    MissingFields,

    #[error("File must be .xlsx")]
    BadExtension,

    #[error("Invalid base64 file content")]
    InvalidBase64,

    #[error("Provide exactly one of filename or key")]
    InvalidBlobRequest,

    #[error("Blob storage is not configured")]
    BlobNotConfigured,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Failed to read request body")]
    UnreadableBody,

    #[error("Server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BlobNotConfigured | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// The `{"error": ...}` body sent to the client.
    pub fn body(&self) -> Value {
        match self {
            ApiError::NotJson { content_type } => json!({
                "error": self.to_string(),
                "content_type": content_type,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }

    /// Log at the level matching the status: client mistakes warn, failures error.
    pub fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "rejected request");
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BodyTooLarge
        } else {
            tracing::debug!(reason = %rejection.body_text(), "body rejected");
            ApiError::UnreadableBody
        }
    }
}

impl From<SheetfmtError> for ApiError {
    fn from(e: SheetfmtError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("processing task failed: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.body())).into_response()
    }
}
