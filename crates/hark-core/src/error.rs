//! Error types for outbound platform calls.

use thiserror::Error;

/// Errors returned by [`Connection`](crate::Connection) send operations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The connection has not been established yet.
    #[error("connection is not established")]
    NotConnected,

    /// The connection was shut down.
    #[error("connection closed")]
    Closed,

    /// The platform answered with an error.
    #[error("platform error ({code}): {message}")]
    Platform { code: String, message: String },

    /// The request never reached the platform.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates a platform error.
    pub fn platform(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
