//! Terminal chat client for roomcast.
//!
//! Shows its own messages immediately (local echo), never shows them twice,
//! and reconnects after the connection drops.

pub mod domain;
pub mod error;
mod formatter;
pub mod runner;
pub mod session;
pub mod transcript;
mod ui;

pub use runner::{ClientConfig, run_client};
