// src/error.rs

//! Unified error handling for newslaunch.

use std::fmt;

use thiserror::Error;

/// Result type alias for newslaunch operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing caller input, or a malformed raw article
    #[error("Validation error: {0}")]
    Validation(String),

    /// The wrapped request body is not valid JSON
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Failure talking to the search API or the stream service
    #[error("Upstream error from {service}: {message}")]
    Upstream { service: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an upstream error, keeping the display text of the cause.
    pub fn upstream(service: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::Upstream {
            service: service.into(),
            message: cause.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status code used when this error reaches the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => 400,
            _ => 500,
        }
    }

    /// Whether the caller sent something we could not accept.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("bad term").status_code(), 400);
        assert_eq!(AppError::bad_request("not json").status_code(), 400);
        assert_eq!(AppError::upstream("guardian", "timeout").status_code(), 500);
        assert_eq!(AppError::config("missing key").status_code(), 500);
    }

    #[test]
    fn test_upstream_message_keeps_cause() {
        let err = AppError::upstream("kinesis", "ResourceNotFoundException");
        assert_eq!(
            err.to_string(),
            "Upstream error from kinesis: ResourceNotFoundException"
        );
        assert!(!err.is_client_error());
    }
}
