//! Room Registry trait 定義
//!
//! ルームのメンバーシップを保持するインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 登録情報は二つの索引で構成されます:
//!
//! - `ConnectionId → Connection`（所属ルームを含む）
//! - `RoomId → Room`（メンバー集合）
//!
//! 変更は Gateway 側のユースケース（join / leave）からのみ行い、
//! Broadcaster は `get_room` で読むだけです。

use async_trait::async_trait;

use super::{Connection, ConnectionId, RegistryError, Room, RoomId};

/// join の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// 新しくメンバーに追加された
    Joined(Connection),
    /// 既にメンバーだった（登録内容は変更されない）
    AlreadyJoined(Connection),
}

impl JoinOutcome {
    pub fn connection(&self) -> &Connection {
        match self {
            Self::Joined(connection) | Self::AlreadyJoined(connection) => connection,
        }
    }
}

/// Room Registry trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 接続をルームに登録
    async fn join(&self, connection: Connection) -> Result<JoinOutcome, RegistryError>;

    /// 接続を登録解除（登録されていなければ `None`）
    async fn leave(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// 接続の登録情報を取得
    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// ルームのメンバーの登録情報を取得
    async fn member_connections(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Connection>, RegistryError>;

    /// Room エンティティを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RegistryError>;
}
