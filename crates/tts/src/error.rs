use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Speech service errors with appropriate HTTP status codes
#[derive(Debug, Error)]
pub enum TtsError {
    /// Request body has no `text` field
    #[error("Missing text parameter")]
    MissingText,

    /// `text` is empty after trimming whitespace
    #[error("Empty text")]
    EmptyText,

    /// Request body is not JSON
    #[error("Unsupported Content-Type, expected: 'Content-Type: application/json'")]
    UnsupportedMediaType,

    /// Request body exceeds the limit in bytes
    #[error("Request body is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Malformed body or out-of-range parameter
    #[error("{0}")]
    InvalidRequest(String),

    /// Provider could not produce audio
    #[error("{0}")]
    Synthesis(String),

    /// Filesystem failure in the artifact store
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The artifact vanished before it could be opened
    #[error("Failed to generate speech")]
    OutputMissing(PathBuf),
}

impl TtsError {
    /// Get the appropriate HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingText | Self::EmptyText | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Synthesis(_) | Self::Io(_) | Self::OutputMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("TTS error: {self}");
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
