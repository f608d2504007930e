//! Conversion logic between DTOs and domain entities.

use roomcast_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Connection, MessageDraft, OutboundEvent, Room, Timestamp};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<ws::SendMessageRequest> for MessageDraft {
    fn from(dto: ws::SendMessageRequest) -> Self {
        Self {
            text: dto.text,
            author_label: dto.author_label,
            client_timestamp: Timestamp::new(dto.client_timestamp),
            client_message_id: dto.client_message_id,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for ws::ReceiveMessage {
    fn from(model: &ChatMessage) -> Self {
        Self {
            r#type: ws::MessageType::ReceiveMessage,
            message_id: model.id.as_str().to_string(),
            text: model.text.clone(),
            author_label: model.author_label.clone(),
            origin_connection_id: model.origin.as_str().to_string(),
            client_timestamp: model.client_timestamp.value(),
            server_timestamp: model.server_timestamp.value(),
        }
    }
}

impl From<&Connection> for http::MemberDetailDto {
    fn from(model: &Connection) -> Self {
        Self {
            connection_id: model.id.as_str().to_string(),
            identity_token: model.identity.as_str().to_string(),
            connected_at: timestamp_to_rfc3339(model.connected_at.value()),
        }
    }
}

/// Build the room detail response. Members are ordered by join time.
pub fn room_detail(room: &Room, mut members: Vec<Connection>) -> http::RoomDetailDto {
    members.sort_by(|a, b| {
        a.connected_at
            .cmp(&b.connected_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    http::RoomDetailDto {
        id: room.id.as_str().to_string(),
        members: members.iter().map(http::MemberDetailDto::from).collect(),
        created_at: timestamp_to_rfc3339(room.created_at.value()),
    }
}

/// Encode an outbound event as a text frame.
pub fn encode_event(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    match event {
        OutboundEvent::Joined {
            connection_id,
            room_id,
        } => serde_json::to_string(&ws::JoinedMessage {
            r#type: ws::MessageType::Joined,
            connection_id: connection_id.as_str().to_string(),
            room_id: room_id.as_str().to_string(),
        }),
        OutboundEvent::PresenceJoined { identity } => {
            serde_json::to_string(&ws::PresenceJoinedMessage {
                r#type: ws::MessageType::PresenceJoined,
                identity_token: identity.as_str().to_string(),
            })
        }
        OutboundEvent::MessageAccepted {
            client_message_id,
            message_id,
            server_timestamp,
        } => serde_json::to_string(&ws::MessageAcceptedMessage {
            r#type: ws::MessageType::MessageAccepted,
            client_message_id: client_message_id.clone(),
            message_id: message_id.as_str().to_string(),
            server_timestamp: server_timestamp.value(),
        }),
        OutboundEvent::ReceiveMessage(message) => {
            serde_json::to_string(&ws::ReceiveMessage::from(message))
        }
    }
}
