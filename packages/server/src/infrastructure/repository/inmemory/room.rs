//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! 二つの HashMap（接続 → 登録情報、ルーム → メンバー集合）を
//! 一つの Mutex の下で保持し、両者が常に一致するようにします。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, JoinOutcome, RegistryError, Room, RoomId, RoomRegistry,
};

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomId, Room>,
}

/// インメモリ Room Registry 実装
///
/// ルームはプロセス起動時に作成され、プロセス終了まで破棄されません。
pub struct InMemoryRoomRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRoomRegistry {
    /// 指定したルームを持つ Registry を作成
    pub fn new(rooms: impl IntoIterator<Item = Room>) -> Self {
        let rooms = rooms
            .into_iter()
            .map(|room| (room.id.clone(), room))
            .collect();
        Self {
            state: Mutex::new(RegistryState {
                connections: HashMap::new(),
                rooms,
            }),
        }
    }

    /// 単一ルームの Registry を作成
    pub fn with_room(room: Room) -> Self {
        Self::new([room])
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(&self, connection: Connection) -> Result<JoinOutcome, RegistryError> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.connections.get(&connection.id) {
            return Ok(JoinOutcome::AlreadyJoined(existing.clone()));
        }

        let room = state
            .rooms
            .get_mut(&connection.room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(connection.room_id.to_string()))?;
        room.add_member(connection.id.clone());
        state
            .connections
            .insert(connection.id.clone(), connection.clone());

        Ok(JoinOutcome::Joined(connection))
    }

    async fn leave(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let mut state = self.state.lock().await;

        let connection = state.connections.remove(connection_id)?;
        if let Some(room) = state.rooms.get_mut(&connection.room_id) {
            room.remove_member(connection_id);
        }

        Some(connection)
    }

    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let state = self.state.lock().await;
        state.connections.get(connection_id).cloned()
    }

    async fn member_connections(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Connection>, RegistryError> {
        let state = self.state.lock().await;
        let room = state
            .rooms
            .get(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))?;

        Ok(room
            .members
            .iter()
            .filter_map(|id| state.connections.get(id).cloned())
            .collect())
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RegistryError> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))
    }
}
