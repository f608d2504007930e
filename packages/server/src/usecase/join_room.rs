//! UseCase: ルーム参加処理（Connection Gateway の Join）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::attach() / execute() メソッド
//! - 参加処理（メンバー登録、joined 応答、presence-joined 通知）
//!
//! ### なぜこのテストが必要か
//! - 参加者本人には presence-joined が届かないことを保証
//! - 二重 join でメンバーが重複せず、通知も再送されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：最初の参加者（通知対象なし）、二人目以降の参加
//! - エッジケース：二重 join、トークン無しの参加
//! - 異常系：存在しないルーム

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionId, IdentityToken, JoinOutcome, MessagePusher, OutboundEvent,
    PusherChannel, RoomId, RoomRegistry, Timestamp,
};

use super::error::JoinError;

/// 参加処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    pub outcome: JoinOutcome,
    /// presence-joined を配送できた接続数
    pub notified: usize,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 参加先のルーム（単一ルーム構成）
    room_id: RoomId,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        room_id: RoomId,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
            room_id,
        }
    }

    /// トランスポート確立時に送信チャンネルを登録する（まだメンバーではない）
    pub async fn attach(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
    }

    /// 参加を実行
    ///
    /// 1. Registry にメンバーとして登録
    /// 2. 参加者本人に joined を返す
    /// 3. 新規参加のときだけ、他のメンバーに presence-joined を通知
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: IdentityToken,
    ) -> Result<JoinReport, JoinError> {
        let connected_at = Timestamp::new(self.clock.now_millis());
        let connection = Connection::new(
            connection_id.clone(),
            self.room_id.clone(),
            identity,
            connected_at,
        );

        let outcome = self
            .registry
            .join(connection)
            .await
            .map_err(|_| JoinError::RoomNotFound(self.room_id.to_string()))?;

        let joined = OutboundEvent::Joined {
            connection_id: connection_id.clone(),
            room_id: self.room_id.clone(),
        };
        if let Err(e) = self.message_pusher.push_to(&connection_id, &joined).await {
            tracing::warn!("Failed to send joined to '{}': {}", connection_id, e);
        }

        let notified = match &outcome {
            JoinOutcome::Joined(connection) => self.broadcast_presence(connection).await,
            JoinOutcome::AlreadyJoined(_) => {
                tracing::debug!("Connection '{}' joined again, ignoring", connection_id);
                0
            }
        };

        Ok(JoinReport { outcome, notified })
    }

    /// 参加者本人を除く全メンバーに presence-joined を通知
    async fn broadcast_presence(&self, joined: &Connection) -> usize {
        let targets = match self.registry.get_room(&joined.room_id).await {
            Ok(room) => room.members_except(&joined.id),
            Err(e) => {
                tracing::warn!("Failed to list members for presence-joined: {}", e);
                return 0;
            }
        };

        let event = OutboundEvent::PresenceJoined {
            identity: joined.identity.clone(),
        };
        match self.message_pusher.broadcast(targets, &event).await {
            Ok(notified) => notified,
            Err(e) => {
                tracing::warn!("Failed to broadcast presence-joined: {}", e);
                0
            }
        }
    }
}
