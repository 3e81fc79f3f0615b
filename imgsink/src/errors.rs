use crate::storage::StorageError;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Content-Type missing or not an image type
    #[error("Unsupported media type: {content_type:?}")]
    UnsupportedMediaType { content_type: Option<String> },

    /// Missing or malformed request metadata
    #[error("{message}")]
    BadRequest { message: String },

    /// Request body exceeds the configured upload limit
    #[error("Upload exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Only GET and POST are served
    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: Method },

    /// Object store write failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::Storage(_) | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Details stay in the logs, callers only ever see the status code
        match &self {
            Error::Storage(e) => {
                tracing::error!(transient = e.is_transient(), "Object store write failed: {:#}", self);
            }
            Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::UnsupportedMediaType { .. }
            | Error::BadRequest { .. }
            | Error::PayloadTooLarge { .. }
            | Error::MethodNotAllowed { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        self.status_code().into_response()
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
