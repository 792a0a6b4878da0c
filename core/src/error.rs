//! Error types for the shop API client.
//!
//! # Design
//! Callers tell failures apart by `ApiError::status()`: HTTP-level failures
//! carry the response status, transport and decode failures carry none, and
//! interceptor failures carry whatever the interceptor chose. `NotFound` is
//! not a separate variant; use `is_not_found()` instead.

use thiserror::Error;

/// Errors returned by `ShopClient` and its resource helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The transport could not complete the round-trip (unreachable host,
    /// malformed URL, interrupted body).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status outside 200..=299.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Raised by a request or response interceptor.
    #[error("{message}")]
    Interceptor { message: String, status: Option<u16> },

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ApiError::Transport(err.to_string())
    }

    /// Error for a non-2xx response, using the generic status message.
    pub fn http(status: u16) -> Self {
        ApiError::Http {
            status,
            message: format!("HTTP error! status: {status}"),
        }
    }

    pub fn interceptor(message: impl Into<String>) -> Self {
        ApiError::Interceptor {
            message: message.into(),
            status: None,
        }
    }

    pub fn interceptor_with_status(message: impl Into<String>, status: u16) -> Self {
        ApiError::Interceptor {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Numeric status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Interceptor { status, .. } => *status,
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Serialization(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
