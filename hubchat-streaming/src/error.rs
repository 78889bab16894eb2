//! Streaming errors.

use hubchat_core::AdapterError;
use thiserror::Error;

/// Errors that can occur while decoding a response stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The transport failed while reading the body.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single line grew past the buffer limit.
    #[error("Line buffer exceeded {0} bytes")]
    BufferOverflow(usize),
}

impl StreamError {
    /// Create from any transport error.
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<StreamError> for AdapterError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Transport(message) => AdapterError::Network(message),
            StreamError::BufferOverflow(_) => AdapterError::Protocol(err.to_string()),
        }
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
