//! UseCase 層
//!
//! - `join_room` / `leave_room`: Connection Gateway（メンバーシップの唯一の変更経路）
//! - `broadcast_message`: Room Broadcaster
//! - `get_room_detail`: 参照専用の HTTP API 向け

pub mod broadcast_message;
pub mod error;
pub mod get_room_detail;
pub mod join_room;
pub mod leave_room;

pub use broadcast_message::{BroadcastMessageUseCase, BroadcastReceipt};
pub use error::{BroadcastError, GetRoomDetailError, JoinError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use join_room::{JoinReport, JoinRoomUseCase};
pub use leave_room::LeaveRoomUseCase;
