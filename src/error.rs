//! Error types for DICT client operations.
//!
//! Three things can go wrong:
//! - `ConnectionRejected`: the server could not be reached or refused the
//!   session in its greeting. Only `connect` returns it.
//! - `Protocol`: a reply did not have the shape the operation expected, or the
//!   server refused the command as malformed. The connection should be closed.
//! - `Transport`: reading or writing the socket failed.
//!
//! A failure status that simply means "nothing found" is not an error; the
//! operations return an empty result instead.

use thiserror::Error;

/// Errors returned by [`DictConnection`](crate::connection::DictConnection).
#[derive(Debug, Error)]
pub enum DictError {
    /// The connection attempt failed or the greeting was a refusal
    #[error("connection rejected: {0}")]
    ConnectionRejected(String),

    /// The server sent something the operation cannot interpret
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O failure on an established connection
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

impl DictError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        DictError::Protocol(message.into())
    }

    pub(crate) fn not_connected() -> Self {
        DictError::Transport(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "connection is closed",
        ))
    }

    pub(crate) fn unexpected_eof(context: &str) -> Self {
        DictError::Transport(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("server closed the connection {}", context),
        ))
    }
}

/// Result type for DICT client operations.
pub type Result<T> = std::result::Result<T, DictError>;
