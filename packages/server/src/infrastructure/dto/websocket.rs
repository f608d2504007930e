//! WebSocket wire format.
//!
//! Every frame is a JSON object whose `type` field names the event. Fields are
//! snake_case; timestamps are Unix milliseconds.

use serde::{Deserialize, Serialize};

/// Event discriminator carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    Join,
    Joined,
    PresenceJoined,
    SendMessage,
    MessageAccepted,
    ReceiveMessage,
}

/// Just the discriminator, used to pick the concrete frame type.
#[derive(Debug, Deserialize)]
pub struct MessageHeader {
    pub r#type: MessageType,
}

/// Read the `type` of a frame without committing to its payload shape.
pub fn peek_message_type(text: &str) -> Option<MessageType> {
    serde_json::from_str::<MessageHeader>(text)
        .ok()
        .map(|header| header.r#type)
}

/// client → server: join the room.
///
/// The token is taken as arbitrary JSON so that a malformed token (a number,
/// an object, `null`) still produces a join rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinMessage {
    pub r#type: MessageType,
    #[serde(default)]
    pub identity_token: Option<serde_json::Value>,
}

impl JoinMessage {
    pub fn new(identity_token: Option<&str>) -> Self {
        Self {
            r#type: MessageType::Join,
            identity_token: identity_token.map(|token| serde_json::Value::String(token.to_string())),
        }
    }

    /// The token, if the client sent it as a string.
    pub fn token_str(&self) -> Option<&str> {
        self.identity_token.as_ref().and_then(|value| value.as_str())
    }
}

/// server → joiner: join round-trip completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedMessage {
    pub r#type: MessageType,
    pub connection_id: String,
    pub room_id: String,
}

/// server → other members: a connection joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceJoinedMessage {
    pub r#type: MessageType,
    pub identity_token: String,
}

/// client → server: submit a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub r#type: MessageType,
    pub text: String,
    #[serde(default)]
    pub author_label: String,
    #[serde(default)]
    pub client_timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<String>,
}

/// server → origin: receipt carrying the server-assigned message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAcceptedMessage {
    pub r#type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<String>,
    pub message_id: String,
    pub server_timestamp: i64,
}

/// server → other members: a broadcast chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveMessage {
    pub r#type: MessageType,
    pub message_id: String,
    pub text: String,
    pub author_label: String,
    pub origin_connection_id: String,
    pub client_timestamp: i64,
    pub server_timestamp: i64,
}
