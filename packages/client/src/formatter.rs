//! Message formatting utilities for client display.

use roomcast_server::domain::ANONYMOUS_LABEL;
use roomcast_shared::time::format_clock_time;

use crate::{
    domain::{ConnectionState, SessionUpdate},
    transcript::TranscriptEntry,
};

/// Label shown for this client's own messages
const SELF_LABEL: &str = "You";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any session update
    pub fn format_update(update: &SessionUpdate) -> String {
        match update {
            SessionUpdate::Status(state) => Self::format_status(*state),
            SessionUpdate::PresenceJoined(identity_token) => {
                Self::format_presence_joined(identity_token)
            }
            SessionUpdate::Entry(entry) => Self::format_entry(entry),
        }
    }

    /// Format a transcript entry as `[HH:MM] label: text`
    ///
    /// Local echoes are labelled "You"; the time shown is the sender's clock.
    pub fn format_entry(entry: &TranscriptEntry) -> String {
        let label = if entry.is_local_echo {
            SELF_LABEL
        } else if entry.author_label.trim().is_empty() {
            ANONYMOUS_LABEL
        } else {
            entry.author_label.as_str()
        };
        format!(
            "\n[{}] {}: {}\n",
            format_clock_time(entry.client_timestamp),
            label,
            entry.text
        )
    }

    /// Format a presence-joined notice
    pub fn format_presence_joined(identity_token: &str) -> String {
        format!("\n+ {} joined the chat\n", identity_token)
    }

    /// Format the connection indicator
    pub fn format_status(state: ConnectionState) -> String {
        let indicator = match state {
            ConnectionState::Connecting => "🟡 Connecting...",
            ConnectionState::Connected => "🟢 Connected",
            ConnectionState::Disconnected => "🔴 Disconnected",
        };
        format!("\n{}\n", indicator)
    }
}
