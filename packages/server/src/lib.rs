//! Real-time chat room broadcaster.
//!
//! Connections join a named room, every message posted by a member is
//! delivered to every other member in submission order, and members are told
//! when someone new arrives.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
