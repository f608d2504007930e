//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server URL cannot be used at all; retrying will not help
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Connection could not be established
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An established connection was lost
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Gave up after the configured number of connection attempts
    #[error("Failed to reconnect after {0} attempts")]
    ReconnectAttemptsExhausted(u32),
}
