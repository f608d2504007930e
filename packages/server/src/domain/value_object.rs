//! Value objects for the chat room domain.
//!
//! Identifiers are opaque strings. Nothing on the message path validates user
//! supplied text: the identity token is display-only and coerced rather than
//! rejected, and message text is forwarded as submitted.

use std::fmt;

/// Label used when a connection joins without a usable identity token.
pub const ANONYMOUS_LABEL: &str = "anonymous";

/// Identifier of the single well-known room.
pub const DEFAULT_ROOM_ID: &str = "chat-room";

/// Server-assigned identifier of one transport session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room key. Only one room exists, but it is addressed by key everywhere so
/// the registry does not assume a singleton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_ID)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display identity supplied by the client at join time.
///
/// Never verified. Missing or blank tokens become [`ANONYMOUS_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_LABEL.to_string())
    }

    /// Coerce whatever the client sent into a display label.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            Some(token) if !token.trim().is_empty() => Self(token.to_string()),
            _ => Self::anonymous(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Server-assigned message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
