//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One member of a room, as shown by the room detail endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetailDto {
    pub connection_id: String,
    pub identity_token: String,
    /// RFC 3339
    pub connected_at: String,
}

/// Room detail response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub members: Vec<MemberDetailDto>,
    /// RFC 3339
    pub created_at: String,
}
