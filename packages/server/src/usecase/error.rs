//! UseCase 層のエラー型

use thiserror::Error;

/// 参加処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

/// ブロードキャスト処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// 送信元がルームに参加していない
    #[error("Connection '{0}' has not joined a room")]
    NotJoined(String),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}
