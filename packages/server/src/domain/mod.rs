//! Domain layer: chat room model and the interfaces the use cases depend on.

pub mod entity;
pub mod error;
pub mod factory;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, Connection, MessageDraft, Room};
pub use error::{MessagePushError, RegistryError};
pub use factory::{ConnectionIdFactory, MessageIdFactory};
pub use pusher::{MessagePusher, OutboundEvent, PusherChannel};
pub use repository::{JoinOutcome, RoomRegistry};
pub use value_object::{
    ANONYMOUS_LABEL, ConnectionId, DEFAULT_ROOM_ID, IdentityToken, MessageId, RoomId, Timestamp,
};

#[cfg(test)]
pub use pusher::MockMessagePusher;
