//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{Connection, Room, RoomId, RoomRegistry};

use super::error::GetRoomDetailError;

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルームと、そのメンバーの登録情報を取得
    pub async fn execute(
        &self,
        room_id: &str,
    ) -> Result<(Room, Vec<Connection>), GetRoomDetailError> {
        let room_id = RoomId::new(room_id);
        let not_found = |_| GetRoomDetailError::RoomNotFound(room_id.to_string());

        let room = self.registry.get_room(&room_id).await.map_err(not_found)?;
        let members = self
            .registry
            .member_connections(&room_id)
            .await
            .map_err(not_found)?;

        Ok((room, members))
    }
}
