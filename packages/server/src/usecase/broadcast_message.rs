//! UseCase: メッセージのブロードキャスト（Room Broadcaster）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastMessageUseCase::execute() メソッド
//! - 送信元以外の全メンバーへの配送、サーバー時刻と message_id の付与、受理通知
//!
//! ### なぜこのテストが必要か
//! - 送信元が receive-message を受け取らないことを保証
//! - 受信者ごとの到着順が投稿順と一致することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数メンバーへのブロードキャスト
//! - エッジケース：送信元しかいないルーム、空文字列（検証しない）
//! - 異常系：join していない接続からの送信

use std::sync::Arc;

use roomcast_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, ConnectionId, MessageDraft, MessageIdFactory, MessagePusher, OutboundEvent,
    RoomRegistry, Timestamp,
};

use super::error::BroadcastError;

/// ブロードキャストの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    /// サーバーが付与した情報を含むメッセージ
    pub message: ChatMessage,
    /// 配送対象（送信元を除くメンバー）
    pub recipients: Vec<ConnectionId>,
    /// 実際に配送できた件数
    pub delivered: usize,
}

/// メッセージブロードキャストのユースケース
pub struct BroadcastMessageUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 時刻付与・配送対象の決定・配送を一つの区間として直列化する
    dispatch_lock: Mutex<()>,
}

impl BroadcastMessageUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
            dispatch_lock: Mutex::new(()),
        }
    }

    /// ブロードキャストを実行
    ///
    /// テキストの検証は行いません（空文字列の抑止はクライアント側の責務）。
    /// 配送は at-most-once で、届かなかった宛先はログに残すだけです。
    pub async fn execute(
        &self,
        origin: &ConnectionId,
        draft: MessageDraft,
    ) -> Result<BroadcastReceipt, BroadcastError> {
        let _dispatch = self.dispatch_lock.lock().await;

        let connection = self
            .registry
            .get_connection(origin)
            .await
            .ok_or_else(|| BroadcastError::NotJoined(origin.to_string()))?;

        let message = ChatMessage {
            id: MessageIdFactory::generate(),
            text: draft.text,
            author_label: draft.author_label,
            origin: origin.clone(),
            client_timestamp: draft.client_timestamp,
            server_timestamp: Timestamp::new(self.clock.now_millis()),
        };

        let recipients = self
            .registry
            .get_room(&connection.room_id)
            .await
            .map_err(|_| BroadcastError::RoomNotFound(connection.room_id.to_string()))?
            .members_except(origin);

        let delivered = self
            .message_pusher
            .broadcast(
                recipients.clone(),
                &OutboundEvent::ReceiveMessage(message.clone()),
            )
            .await
            .map_err(|e| BroadcastError::BroadcastFailed(e.to_string()))?;

        let accepted = OutboundEvent::MessageAccepted {
            client_message_id: draft.client_message_id,
            message_id: message.id.clone(),
            server_timestamp: message.server_timestamp,
        };
        if let Err(e) = self.message_pusher.push_to(origin, &accepted).await {
            tracing::warn!("Failed to send message-accepted to '{}': {}", origin, e);
        }

        Ok(BroadcastReceipt {
            message,
            recipients,
            delivered,
        })
    }
}
