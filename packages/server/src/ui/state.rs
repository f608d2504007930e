//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    BroadcastMessageUseCase, GetRoomDetailUseCase, JoinRoomUseCase, LeaveRoomUseCase,
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// BroadcastMessageUseCase（メッセージブロードキャストのユースケース）
    pub broadcast_message_usecase: Arc<BroadcastMessageUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}
