//! Error types for codebox-core.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for codebox-core operations.
pub type Result<T> = std::result::Result<T, CodeBoxError>;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum CodeBoxError {
    /// Operation invoked while no session is active.
    #[error("make sure to start your CodeBox before using it")]
    NotStarted,

    /// Operation invoked after the transport was released by `cleanup`.
    #[error("CodeBox transport has been disposed")]
    Disposed,

    /// Failure reported by the transport (network, timeout, HTTP status).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response body did not match the expected schema.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid client configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl CodeBoxError {
    /// True for failures detected locally before any request was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Disposed)
    }
}

/// Errors reported by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Remote service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Request did not complete within the configured timeout.
    #[error("request timeout after {0:?}")]
    Timeout(Duration),

    /// Connection or request construction failure.
    #[error("request failed: {0}")]
    Request(String),

    /// Response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Base URL is empty or whitespace.
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    /// Base URL does not use an http(s) scheme.
    #[error("base URL must use http or https: {0}")]
    InvalidBaseUrl(String),

    /// Timeout of zero length.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// `.env` file exists but could not be read or parsed.
    #[error("failed to load env file {}: {message}", path.display())]
    EnvFile {
        /// Path of the env file
        path: PathBuf,
        /// Reason reported by the parser
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(CodeBoxError::NotStarted.is_precondition());
        assert!(CodeBoxError::Disposed.is_precondition());
        assert!(!CodeBoxError::Protocol("missing id".into()).is_precondition());
        assert!(!CodeBoxError::from(TransportError::Timeout(Duration::from_secs(1))).is_precondition());
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err = CodeBoxError::from(TransportError::Status {
            status: 502,
            body: "bad gateway".into(),
        });
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }
}
