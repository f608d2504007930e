//! Utilities shared by the roomcast server and client.

pub mod logger;
pub mod time;
