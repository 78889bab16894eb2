//! Error types for hubchat.
//!
//! The taxonomy separates the four ways a send can go wrong:
//!
//! - **Configuration**: the adapter was used before `initialize`, or a required
//!   selection is missing. Raised before any network call.
//! - **Transport**: non-2xx status or a network failure. Reported through
//!   `on_error` and terminates the send.
//! - **Protocol**: a malformed event payload. Logged and skipped per event.
//! - **Cancellation**: the caller aborted the send. Never reported through `on_error`.

use std::time::Duration;
use thiserror::Error;

/// The main error type for hubchat operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Adapter used without a usable configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested framework has no adapter.
    #[error("Unsupported framework: {0}")]
    UnsupportedFramework(String),

    /// A send is already in flight on this adapter instance.
    #[error("A message is already being sent on this adapter")]
    Busy,

    /// Non-success HTTP status from the backend.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Connection or read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out. Carries the configured timeout when known.
    #[error("Request timeout{}", .0.map(|d| format!(" after {d:?}")).unwrap_or_default())]
    Timeout(Option<Duration>),

    /// Error event reported by the backend inside the stream.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Malformed payload.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The send was cancelled by the caller.
    #[error("Request cancelled")]
    Cancelled,
}

impl AdapterError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a backend-reported error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Error raised when an adapter is used before `initialize`.
    pub fn not_initialized() -> Self {
        Self::Configuration("adapter not initialized".to_string())
    }

    /// Whether this error represents a caller-initiated abort.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether this error is raised before any network I/O.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnsupportedFramework(_) | Self::Busy
        )
    }

    /// Whether retrying the same send may succeed.
    ///
    /// The adapters never retry on their own; this is a hint for callers that
    /// layer retries on top of `send_message`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl AdapterError {
    /// Map a transport error from a client configured with `timeout`.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout(Some(timeout))
        } else {
            AdapterError::from(err)
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout(None)
        } else if let Some(status) = err.status() {
            AdapterError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            AdapterError::Network(err.to_string())
        }
    }
}

/// Result type alias using [`AdapterError`].
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdapterError::http(502, "Bad gateway");
        assert_eq!(err.to_string(), "HTTP error: 502 - Bad gateway");

        let err = AdapterError::not_initialized();
        assert_eq!(err.to_string(), "Configuration error: adapter not initialized");

        let err = AdapterError::UnsupportedFramework("Unknown".into());
        assert!(err.to_string().contains("Unknown"));

        let err = AdapterError::Timeout(Some(Duration::from_secs(300)));
        assert_eq!(err.to_string(), "Request timeout after 300s");
        assert_eq!(AdapterError::Timeout(None).to_string(), "Request timeout");
    }

    #[test]
    fn test_classifiers() {
        assert!(AdapterError::Cancelled.is_cancellation());
        assert!(!AdapterError::network("reset").is_cancellation());

        assert!(AdapterError::Busy.is_configuration());
        assert!(AdapterError::configuration("missing resource").is_configuration());
        assert!(!AdapterError::http(500, "").is_configuration());
    }

    #[test]
    fn test_is_retryable() {
        assert!(AdapterError::Timeout(Some(Duration::from_secs(5))).is_retryable());
        assert!(AdapterError::Timeout(None).is_retryable());
        assert!(AdapterError::network("refused").is_retryable());
        assert!(AdapterError::http(429, "slow down").is_retryable());
        assert!(AdapterError::http(503, "unavailable").is_retryable());

        assert!(!AdapterError::http(400, "bad request").is_retryable());
        assert!(!AdapterError::Cancelled.is_retryable());
        assert!(!AdapterError::backend("agent crashed").is_retryable());
    }
}
