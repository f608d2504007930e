//! UseCase: ルーム退出処理（Connection Gateway の Leave）
//!
//! トランスポートの切断時に自動的に呼ばれます。
//! 残りのメンバーへの presence-left 通知は行いません。

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, MessagePusher, RoomRegistry};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 退出を実行
    ///
    /// メンバー登録と送信チャンネルの両方を解除します。
    /// join していなかった接続では `None` を返します（チャンネルは解除されます）。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let removed = self.registry.leave(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;
        removed
    }
}
