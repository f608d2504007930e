//! Identifier generation.

use uuid::Uuid;

use super::value_object::{ConnectionId, MessageId};

/// Allocates a fresh [`ConnectionId`] for every accepted transport session.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId::new(Uuid::new_v4().to_string())
    }
}

/// Allocates server-side message identifiers.
pub struct MessageIdFactory;

impl MessageIdFactory {
    pub fn generate() -> MessageId {
        MessageId::new(Uuid::new_v4().to_string())
    }
}
