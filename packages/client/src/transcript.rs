//! Client-side transcript.
//!
//! The transcript is append-only: local echoes are annotated in place when the
//! server accepts them, nothing is ever removed or reordered.

use roomcast_server::infrastructure::dto::websocket::ReceiveMessage;

/// One line of the chat as this client saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub text: String,
    pub author_label: String,
    /// Connection that sent the message (unknown for a local echo sent before `joined`)
    pub origin_connection_id: Option<String>,
    pub client_timestamp: i64,
    /// Set on local echoes only
    pub client_message_id: Option<String>,
    /// Server-assigned id, known once the message is accepted or received
    pub message_id: Option<String>,
    pub server_timestamp: Option<i64>,
    /// `true` when this entry was appended by our own send
    pub is_local_echo: bool,
}

impl TranscriptEntry {
    pub fn local_echo(
        text: impl Into<String>,
        author_label: impl Into<String>,
        origin_connection_id: Option<String>,
        client_timestamp: i64,
        client_message_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            author_label: author_label.into(),
            origin_connection_id,
            client_timestamp,
            client_message_id: Some(client_message_id.into()),
            message_id: None,
            server_timestamp: None,
            is_local_echo: true,
        }
    }
}

impl From<ReceiveMessage> for TranscriptEntry {
    fn from(message: ReceiveMessage) -> Self {
        Self {
            text: message.text,
            author_label: message.author_label,
            origin_connection_id: Some(message.origin_connection_id),
            client_timestamp: message.client_timestamp,
            client_message_id: None,
            message_id: Some(message.message_id),
            server_timestamp: Some(message.server_timestamp),
            is_local_echo: false,
        }
    }
}

/// Ordered chat history kept across reconnections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach the server id and time to the local echo with `client_message_id`.
    ///
    /// Returns `false` if no such local echo exists.
    pub fn annotate_local_echo(
        &mut self,
        client_message_id: &str,
        message_id: &str,
        server_timestamp: i64,
    ) -> bool {
        match self.entries.iter_mut().rev().find(|entry| {
            entry.is_local_echo && entry.client_message_id.as_deref() == Some(client_message_id)
        }) {
            Some(entry) => {
                entry.message_id = Some(message_id.to_string());
                entry.server_timestamp = Some(server_timestamp);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcast_server::infrastructure::dto::websocket::MessageType;

    #[test]
    fn test_received_entry_is_not_local_echo() {
        // テスト項目: 受信したメッセージは is_local_echo = false のエントリになる
        // given (前提条件):
        let message = ReceiveMessage {
            r#type: MessageType::ReceiveMessage,
            message_id: "m-1".to_string(),
            text: "hi".to_string(),
            author_label: "bob".to_string(),
            origin_connection_id: "conn-b".to_string(),
            client_timestamp: 100,
            server_timestamp: 200,
        };

        // when (操作):
        let entry = TranscriptEntry::from(message);

        // then (期待する結果):
        assert!(!entry.is_local_echo);
        assert_eq!(entry.message_id.as_deref(), Some("m-1"));
        assert_eq!(entry.origin_connection_id.as_deref(), Some("conn-b"));
        assert_eq!(entry.server_timestamp, Some(200));
    }

    #[test]
    fn test_annotate_local_echo() {
        // テスト項目: client_message_id が一致するローカルエコーにサーバー側の ID と時刻が付与される
        // given (前提条件):
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::local_echo("hi", "alice", None, 100, "c-1"));
        transcript.push(TranscriptEntry::local_echo("again", "alice", None, 110, "c-2"));

        // when (操作):
        let annotated = transcript.annotate_local_echo("c-1", "m-1", 150);

        // then (期待する結果):
        assert!(annotated);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.entries()[0].message_id.as_deref(), Some("m-1"));
        assert_eq!(transcript.entries()[0].server_timestamp, Some(150));
        assert_eq!(transcript.entries()[1].message_id, None);
    }

    #[test]
    fn test_annotate_unknown_local_echo() {
        // テスト項目: 該当するローカルエコーがなければ何も変更しない
        // given (前提条件):
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::local_echo("hi", "alice", None, 100, "c-1"));

        // when (操作):
        let annotated = transcript.annotate_local_echo("c-9", "m-9", 150);

        // then (期待する結果):
        assert!(!annotated);
        assert_eq!(transcript.entries()[0].message_id, None);
    }
}
