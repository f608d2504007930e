//! MessagePusher trait 定義
//!
//! 接続へのイベント配送のインターフェース。
//! WebSocket の sender 管理は Infrastructure 層が担当し、
//! UseCase 層は配送先の ConnectionId とドメインイベントだけを渡します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    ChatMessage, ConnectionId, IdentityToken, MessageId, MessagePushError, RoomId, Timestamp,
};

/// Outbound channel of one connection. Carries encoded text frames.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Events the server pushes to connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Join round-trip completed; sent to the joiner only.
    Joined {
        connection_id: ConnectionId,
        room_id: RoomId,
    },
    /// Another connection joined the room.
    PresenceJoined { identity: IdentityToken },
    /// Receipt for the origin of a broadcast.
    MessageAccepted {
        client_message_id: Option<String>,
        message_id: MessageId,
        server_timestamp: Timestamp,
    },
    /// A message fanned out from another member.
    ReceiveMessage(ChatMessage),
}

/// MessagePusher trait
///
/// 配送は at-most-once。失敗した宛先はログに残してスキップします。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にイベントを送信し、実際に配送できた件数を返す
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError>;
}
