//! Infrastructure layer: in-memory registry, WebSocket delivery, wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
