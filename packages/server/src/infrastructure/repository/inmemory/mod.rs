//! In-memory registry implementations.

pub mod room;

pub use room::InMemoryRoomRegistry;
