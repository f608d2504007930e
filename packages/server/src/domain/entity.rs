//! Domain entities: connections, the room, and in-flight chat messages.

use std::collections::HashSet;

use super::value_object::{ConnectionId, IdentityToken, MessageId, RoomId, Timestamp};

/// One live transport session that has completed the join handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub room_id: RoomId,
    pub identity: IdentityToken,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        room_id: RoomId,
        identity: IdentityToken,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            identity,
            connected_at,
        }
    }
}

/// Broadcast domain.
///
/// `members` holds a connection iff it is connected and has joined. Being a
/// set, a repeated join cannot create a second entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub members: HashSet<ConnectionId>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: HashSet::new(),
            created_at,
        }
    }

    /// Returns `false` if the connection was already a member.
    pub fn add_member(&mut self, connection_id: ConnectionId) -> bool {
        self.members.insert(connection_id)
    }

    /// Returns `false` if the connection was not a member.
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        self.members.remove(connection_id)
    }

    /// Every member except `exclude`.
    pub fn members_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|id| *id != exclude)
            .cloned()
            .collect()
    }
}

/// A message submitted by a member, before the server stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub text: String,
    pub author_label: String,
    pub client_timestamp: Timestamp,
    /// Correlation id chosen by the client, echoed back in the accept receipt.
    pub client_message_id: Option<String>,
}

/// A stamped message as fanned out to recipients. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub author_label: String,
    pub origin: ConnectionId,
    pub client_timestamp: Timestamp,
    pub server_timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(RoomId::default(), Timestamp::new(1000))
    }

    #[test]
    fn test_add_member_twice_keeps_single_entry() {
        // テスト項目: 同じ接続を二回追加してもメンバーは一件のまま
        // given (前提条件):
        let mut room = room();
        let alice = ConnectionId::new("alice");

        // when (操作):
        let first = room.add_member(alice.clone());
        let second = room.add_member(alice.clone());

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(room.members.len(), 1);
        assert!(room.members.contains(&alice));
    }

    #[test]
    fn test_remove_member() {
        // テスト項目: メンバーを削除すると以降はメンバーではなくなる
        // given (前提条件):
        let mut room = room();
        let alice = ConnectionId::new("alice");
        room.add_member(alice.clone());

        // when (操作):
        let removed = room.remove_member(&alice);
        let removed_again = room.remove_member(&alice);

        // then (期待する結果):
        assert!(removed);
        assert!(!removed_again);
        assert!(!room.members.contains(&alice));
    }

    #[test]
    fn test_members_except_excludes_origin() {
        // テスト項目: 指定した接続以外の全メンバーが返される
        // given (前提条件):
        let mut room = room();
        let alice = ConnectionId::new("alice");
        let bob = ConnectionId::new("bob");
        let charlie = ConnectionId::new("charlie");
        room.add_member(alice.clone());
        room.add_member(bob.clone());
        room.add_member(charlie.clone());

        // when (操作):
        let targets = room.members_except(&alice);

        // then (期待する結果):
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&bob));
        assert!(targets.contains(&charlie));
        assert!(!targets.contains(&alice));
    }

    #[test]
    fn test_members_except_non_member_returns_everyone() {
        // テスト項目: メンバーでない接続を除外指定しても全メンバーが返される
        // given (前提条件):
        let mut room = room();
        room.add_member(ConnectionId::new("alice"));
        room.add_member(ConnectionId::new("bob"));

        // when (操作):
        let targets = room.members_except(&ConnectionId::new("ghost"));

        // then (期待する結果):
        assert_eq!(targets.len(), 2);
    }
}
