//! Domain logic for client-side operations.
//!
//! `ChatSession` owns the transcript and the connection state. It performs no
//! I/O: the session loop feeds it decoded server events and user input, and
//! sends whatever frames it hands back.

use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use roomcast_server::infrastructure::dto::websocket::{
    JoinedMessage, MessageAcceptedMessage, MessageType, PresenceJoinedMessage, ReceiveMessage,
    SendMessageRequest, peek_message_type,
};
use roomcast_shared::time::Clock;
use uuid::Uuid;

use crate::{
    error::ClientError,
    transcript::{Transcript, TranscriptEntry},
};

/// How many accepted message ids are remembered for self-echo suppression
pub const OWN_MESSAGE_ID_CAPACITY: usize = 256;

/// Connection lifecycle of a single transport session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// Decoded server → client frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Joined(JoinedMessage),
    PresenceJoined(PresenceJoinedMessage),
    MessageAccepted(MessageAcceptedMessage),
    ReceiveMessage(ReceiveMessage),
}

impl ServerEvent {
    /// Decode a text frame; `None` for garbage and for client → server types
    pub fn parse(text: &str) -> Option<Self> {
        match peek_message_type(text)? {
            MessageType::Joined => serde_json::from_str(text).ok().map(Self::Joined),
            MessageType::PresenceJoined => {
                serde_json::from_str(text).ok().map(Self::PresenceJoined)
            }
            MessageType::MessageAccepted => {
                serde_json::from_str(text).ok().map(Self::MessageAccepted)
            }
            MessageType::ReceiveMessage => {
                serde_json::from_str(text).ok().map(Self::ReceiveMessage)
            }
            MessageType::Join | MessageType::SendMessage => None,
        }
    }
}

/// Something the terminal should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Status(ConnectionState),
    PresenceJoined(String),
    Entry(TranscriptEntry),
}

/// Client-side chat state: transcript, self-echo bookkeeping and connection state
pub struct ChatSession {
    state: ConnectionState,
    connection_id: Option<String>,
    identity_token: Option<String>,
    author_label: String,
    transcript: Transcript,
    /// Server ids of messages this client sent, oldest first
    own_message_ids: VecDeque<String>,
    own_message_id_set: HashSet<String>,
    clock: Arc<dyn Clock>,
}

impl ChatSession {
    /// A new session starts out `Connecting`.
    pub fn new(
        author_label: impl Into<String>,
        identity_token: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: ConnectionState::Connecting,
            connection_id: None,
            identity_token,
            author_label: author_label.into(),
            transcript: Transcript::new(),
            own_message_ids: VecDeque::with_capacity(OWN_MESSAGE_ID_CAPACITY),
            own_message_id_set: HashSet::with_capacity(OWN_MESSAGE_ID_CAPACITY),
            clock,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Id of the current (or most recent) connection, once `joined` arrived
    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    pub fn identity_token(&self) -> Option<&str> {
        self.identity_token.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// A new transport session starts. The transcript is kept as is.
    pub fn begin_connection(&mut self) {
        self.state = ConnectionState::Connecting;
        self.connection_id = None;
    }

    pub fn on_joined(&mut self, connection_id: impl Into<String>) {
        self.connection_id = Some(connection_id.into());
        self.state = ConnectionState::Connected;
    }

    pub fn on_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Append a local echo and build the frame to submit.
    ///
    /// Returns `None` (and changes nothing) when the trimmed text is empty or
    /// the session is not connected.
    pub fn send(&mut self, text: &str) -> Option<(SendMessageRequest, TranscriptEntry)> {
        if self.state != ConnectionState::Connected {
            tracing::debug!("Dropping input while {:?}", self.state);
            return None;
        }

        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let client_message_id = Uuid::new_v4().to_string();
        let client_timestamp = self.clock.now_millis();

        let entry = TranscriptEntry::local_echo(
            text,
            self.author_label.clone(),
            self.connection_id.clone(),
            client_timestamp,
            client_message_id.clone(),
        );
        self.transcript.push(entry.clone());

        let request = SendMessageRequest {
            r#type: MessageType::SendMessage,
            text: text.to_string(),
            author_label: self.author_label.clone(),
            client_timestamp,
            client_message_id: Some(client_message_id),
        };

        Some((request, entry))
    }

    /// Append a broadcast message unless it is our own.
    pub fn on_receive(&mut self, message: ReceiveMessage) -> Option<TranscriptEntry> {
        if self.is_self_originated(&message) {
            tracing::debug!("Ignoring echo of own message '{}'", message.message_id);
            return None;
        }

        let entry = TranscriptEntry::from(message);
        self.transcript.push(entry.clone());
        Some(entry)
    }

    /// Remember the server id of one of our sends and annotate its local echo.
    pub fn on_accepted(&mut self, accepted: MessageAcceptedMessage) {
        if let Some(client_message_id) = accepted.client_message_id.as_deref() {
            self.transcript.annotate_local_echo(
                client_message_id,
                &accepted.message_id,
                accepted.server_timestamp,
            );
        }
        self.remember_own_message_id(accepted.message_id);
    }

    /// Apply a server event, returning what (if anything) should be shown
    pub fn handle_event(&mut self, event: ServerEvent) -> Option<SessionUpdate> {
        match event {
            ServerEvent::Joined(joined) => {
                self.on_joined(joined.connection_id);
                Some(SessionUpdate::Status(ConnectionState::Connected))
            }
            ServerEvent::PresenceJoined(presence) => {
                Some(SessionUpdate::PresenceJoined(presence.identity_token))
            }
            ServerEvent::MessageAccepted(accepted) => {
                self.on_accepted(accepted);
                None
            }
            ServerEvent::ReceiveMessage(message) => {
                self.on_receive(message).map(SessionUpdate::Entry)
            }
        }
    }

    fn remember_own_message_id(&mut self, message_id: String) {
        if !self.own_message_id_set.insert(message_id.clone()) {
            return;
        }
        self.own_message_ids.push_back(message_id);
        if self.own_message_ids.len() > OWN_MESSAGE_ID_CAPACITY
            && let Some(oldest) = self.own_message_ids.pop_front()
        {
            self.own_message_id_set.remove(&oldest);
        }
    }

    fn is_self_originated(&self, message: &ReceiveMessage) -> bool {
        self.connection_id.as_deref() == Some(message.origin_connection_id.as_str())
            || self.own_message_id_set.contains(&message.message_id)
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// # Arguments
///
/// * `error` - The client error to check
///
/// # Returns
///
/// `true` if retrying cannot succeed (e.g., InvalidUrl), `false` otherwise
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidUrl(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The number of failed attempts so far
/// * `max_attempts` - The maximum number of connection attempts allowed
///
/// # Returns
///
/// `true` if reconnection should be attempted, `false` otherwise
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcast_shared::time::FixedClock;

    fn connected_session(connection_id: &str) -> ChatSession {
        let mut session = ChatSession::new(
            "alice",
            Some("tokA".to_string()),
            Arc::new(FixedClock::new(1000)),
        );
        session.begin_connection();
        session.on_joined(connection_id);
        session
    }

    fn receive(message_id: &str, origin: &str, text: &str) -> ReceiveMessage {
        ReceiveMessage {
            r#type: MessageType::ReceiveMessage,
            message_id: message_id.to_string(),
            text: text.to_string(),
            author_label: "bob".to_string(),
            origin_connection_id: origin.to_string(),
            client_timestamp: 900,
            server_timestamp: 950,
        }
    }

    #[test]
    fn test_state_machine_transitions() {
        // テスト項目: 作成直後は Connecting で、Connected → Disconnected → Connecting と遷移する
        // given (前提条件):
        let mut session = ChatSession::new("alice", None, Arc::new(FixedClock::new(0)));
        let initial = session.state();

        // when (操作):
        session.on_joined("conn-a");
        let connected = session.state();
        session.on_disconnected();
        let disconnected = session.state();
        session.begin_connection();

        // then (期待する結果):
        assert_eq!(initial, ConnectionState::Connecting);
        assert_eq!(connected, ConnectionState::Connected);
        assert_eq!(disconnected, ConnectionState::Disconnected);
        assert_eq!(session.state(), ConnectionState::Connecting);
        assert_eq!(session.connection_id(), None);
    }

    #[test]
    fn test_send_appends_local_echo() {
        // テスト項目: 送信するとトリム済みテキストのローカルエコーが即座に追加される
        // given (前提条件):
        let mut session = connected_session("conn-a");

        // when (操作):
        let (request, entry) = session.send("  hi  ").unwrap();

        // then (期待する結果):
        assert_eq!(request.r#type, MessageType::SendMessage);
        assert_eq!(request.text, "hi");
        assert_eq!(request.author_label, "alice");
        assert_eq!(request.client_timestamp, 1000);
        assert_eq!(request.client_message_id, entry.client_message_id);
        assert!(entry.is_local_echo);
        assert_eq!(entry.origin_connection_id.as_deref(), Some("conn-a"));
        assert_eq!(session.transcript().entries(), &[entry]);
    }

    #[test]
    fn test_send_whitespace_is_noop() {
        // テスト項目: 空白のみの入力は何も送らず、トランスクリプトも変わらない
        // given (前提条件):
        let mut session = connected_session("conn-a");

        // when (操作):
        let empty = session.send("");
        let blank = session.send("   \t ");

        // then (期待する結果):
        assert!(empty.is_none());
        assert!(blank.is_none());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_send_while_not_connected_is_dropped() {
        // テスト項目: Connected 以外の状態での入力は破棄され、キューにも残らない
        // given (前提条件):
        let mut session = ChatSession::new("alice", None, Arc::new(FixedClock::new(0)));
        session.begin_connection();

        // when (操作):
        let while_connecting = session.send("hello");
        session.on_joined("conn-a");
        session.on_disconnected();
        let while_disconnected = session.send("hello");

        // then (期待する結果):
        assert!(while_connecting.is_none());
        assert!(while_disconnected.is_none());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_receive_from_other_is_appended() {
        // テスト項目: 他の接続からのメッセージはトランスクリプトに追加される
        // given (前提条件):
        let mut session = connected_session("conn-a");

        // when (操作):
        let entry = session.on_receive(receive("m-1", "conn-b", "hello"));

        // then (期待する結果):
        let entry = entry.unwrap();
        assert!(!entry.is_local_echo);
        assert_eq!(entry.text, "hello");
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_receive_own_origin_is_ignored() {
        // テスト項目: 自分の connection_id が送信元のメッセージは追加されない
        // given (前提条件):
        let mut session = connected_session("conn-a");
        session.send("hi").unwrap();

        // when (操作):
        let entry = session.on_receive(receive("m-1", "conn-a", "hi"));

        // then (期待する結果):
        assert!(entry.is_none());
        assert_eq!(session.transcript().len(), 1);
        assert!(session.transcript().entries()[0].is_local_echo);
    }

    #[test]
    fn test_receive_accepted_message_id_is_ignored() {
        // テスト項目: 受理通知で受け取った message_id のメッセージは送信元が異なっても追加されない
        // given (前提条件):
        let mut session = connected_session("conn-a");
        let (request, _) = session.send("hi").unwrap();
        session.on_accepted(MessageAcceptedMessage {
            r#type: MessageType::MessageAccepted,
            client_message_id: request.client_message_id,
            message_id: "m-1".to_string(),
            server_timestamp: 1200,
        });

        // when (操作):
        let entry = session.on_receive(receive("m-1", "conn-old", "hi"));

        // then (期待する結果):
        assert!(entry.is_none());
        assert_eq!(session.transcript().len(), 1);
        let echo = &session.transcript().entries()[0];
        assert_eq!(echo.message_id.as_deref(), Some("m-1"));
        assert_eq!(echo.server_timestamp, Some(1200));
    }

    fn accepted(message_id: &str) -> MessageAcceptedMessage {
        MessageAcceptedMessage {
            r#type: MessageType::MessageAccepted,
            client_message_id: None,
            message_id: message_id.to_string(),
            server_timestamp: 0,
        }
    }

    #[test]
    fn test_own_message_ids_are_bounded() {
        // テスト項目: 記憶する受理済み message_id は上限件数までで、古いものから忘れる
        // given (前提条件):
        let mut session = connected_session("conn-a");
        for i in 0..=OWN_MESSAGE_ID_CAPACITY {
            session.on_accepted(accepted(&format!("m-{i}")));
        }

        // when (操作):
        let oldest = session.on_receive(receive("m-0", "conn-old", "forgotten"));
        let newest = session.on_receive(receive(
            &format!("m-{OWN_MESSAGE_ID_CAPACITY}"),
            "conn-old",
            "remembered",
        ));

        // then (期待する結果):
        assert!(oldest.is_some());
        assert!(newest.is_none());
        assert_eq!(session.own_message_ids.len(), OWN_MESSAGE_ID_CAPACITY);
        assert_eq!(session.own_message_id_set.len(), OWN_MESSAGE_ID_CAPACITY);
    }

    #[test]
    fn test_repeated_accept_is_remembered_once() {
        // テスト項目: 同じ message_id の受理通知が重複しても一件として記憶される
        // given (前提条件):
        let mut session = connected_session("conn-a");

        // when (操作):
        session.on_accepted(accepted("m-1"));
        session.on_accepted(accepted("m-1"));

        // then (期待する結果):
        assert_eq!(session.own_message_ids.len(), 1);
        assert!(session.on_receive(receive("m-1", "conn-old", "hi")).is_none());
    }

    #[test]
    fn test_reconnect_keeps_transcript() {
        // テスト項目: 再接続してもトランスクリプトは保持され、新しい connection_id に切り替わる
        // given (前提条件):
        let mut session = connected_session("conn-a");
        session.send("before").unwrap();
        session.on_disconnected();

        // when (操作):
        session.begin_connection();
        let during = session.connection_id().map(str::to_string);
        session.on_joined("conn-a2");

        // then (期待する結果):
        assert_eq!(during, None);
        assert_eq!(session.connection_id(), Some("conn-a2"));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_handle_event() {
        // テスト項目: サーバーイベントに応じて表示すべき更新が返る
        // given (前提条件):
        let mut session = ChatSession::new("alice", None, Arc::new(FixedClock::new(0)));
        session.begin_connection();

        // when (操作):
        let joined = session.handle_event(ServerEvent::Joined(JoinedMessage {
            r#type: MessageType::Joined,
            connection_id: "conn-a".to_string(),
            room_id: "chat-room".to_string(),
        }));
        let presence = session.handle_event(ServerEvent::PresenceJoined(PresenceJoinedMessage {
            r#type: MessageType::PresenceJoined,
            identity_token: "tokB".to_string(),
        }));
        let accepted = session.handle_event(ServerEvent::MessageAccepted(MessageAcceptedMessage {
            r#type: MessageType::MessageAccepted,
            client_message_id: None,
            message_id: "m-0".to_string(),
            server_timestamp: 0,
        }));

        // then (期待する結果):
        assert_eq!(joined, Some(SessionUpdate::Status(ConnectionState::Connected)));
        assert_eq!(presence, Some(SessionUpdate::PresenceJoined("tokB".to_string())));
        assert_eq!(accepted, None);
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_parse_server_event() {
        // テスト項目: サーバーからのフレームだけがイベントとして解釈される
        // given (前提条件):
        let presence = r#"{"type":"presence-joined","identity_token":"tokB"}"#;
        let client_frame = r#"{"type":"send-message","text":"hi"}"#;
        let garbage = "not json";

        // when (操作):
        let parsed = ServerEvent::parse(presence);

        // then (期待する結果):
        assert!(matches!(
            parsed,
            Some(ServerEvent::PresenceJoined(ref p)) if p.identity_token == "tokB"
        ));
        assert_eq!(ServerEvent::parse(client_frame), None);
        assert_eq!(ServerEvent::parse(garbage), None);
    }

    #[test]
    fn test_should_exit_immediately_with_invalid_url() {
        // テスト項目: InvalidUrl エラーの場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = ClientError::InvalidUrl("nope".to_string());

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 試行回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let error = ClientError::ConnectionLost("reset".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 4, 5);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 試行回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("refused".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_with_invalid_url() {
        // テスト項目: InvalidUrl エラーの場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::InvalidUrl("nope".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 0, 5);

        // then (期待する結果):
        assert!(!result);
    }
}
