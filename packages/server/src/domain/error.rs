//! Domain-level error types.

use thiserror::Error;

/// Errors raised by a [`super::RoomRegistry`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

/// Errors raised while pushing events to connections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' is not attached")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to encode event: {0}")]
    Encode(String),
}
