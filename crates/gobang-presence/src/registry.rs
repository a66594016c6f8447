//! Per-scope maps from a user to the connection they hold, used to
//! reject a second login and to find who is reachable.

use std::collections::HashMap;
use std::fmt;

use gobang_protocol::UserId;
use gobang_transport::ConnectionId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The two places a user can be connected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The lobby connection, used for matchmaking.
    Hall,
    /// The in-game connection.
    Room,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hall => f.write_str("hall"),
            Self::Room => f.write_str("room"),
        }
    }
}

/// Tracks which users hold a live connection, per [`Scope`].
///
/// The two scopes are independent maps with their own locks; nothing
/// here stops a user from being in both. Every method takes exactly one
/// lock and releases it before returning.
#[derive(Debug, Default)]
pub struct Presence {
    hall: Mutex<HashMap<UserId, ConnectionId>>,
    room: Mutex<HashMap<UserId, ConnectionId>>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, scope: Scope) -> &Mutex<HashMap<UserId, ConnectionId>> {
        match scope {
            Scope::Hall => &self.hall,
            Scope::Room => &self.room,
        }
    }

    /// Records `uid` as reachable on `conn`, replacing any earlier entry.
    pub fn enter(&self, scope: Scope, uid: UserId, conn: ConnectionId) {
        self.map(scope).lock().insert(uid, conn);
        tracing::debug!(%scope, %uid, %conn, "presence entered");
    }

    /// Forgets `uid` in `scope`. Absent users are ignored.
    pub fn exit(&self, scope: Scope, uid: UserId) {
        if self.map(scope).lock().remove(&uid).is_some() {
            tracing::debug!(%scope, %uid, "presence exited");
        }
    }

    pub fn is_present(&self, scope: Scope, uid: UserId) -> bool {
        self.map(scope).lock().contains_key(&uid)
    }

    pub fn connection_for(&self, scope: Scope, uid: UserId) -> Option<ConnectionId> {
        self.map(scope).lock().get(&uid).copied()
    }

    /// Number of users present in `scope`.
    pub fn count(&self, scope: Scope) -> usize {
        self.map(scope).lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_enter_then_is_present() {
        let presence = Presence::new();
        presence.enter(Scope::Hall, UserId(1), conn(10));

        assert!(presence.is_present(Scope::Hall, UserId(1)));
        assert_eq!(presence.connection_for(Scope::Hall, UserId(1)), Some(conn(10)));
    }

    #[test]
    fn test_scopes_are_independent() {
        let presence = Presence::new();
        presence.enter(Scope::Hall, UserId(1), conn(10));

        assert!(!presence.is_present(Scope::Room, UserId(1)));
        assert_eq!(presence.connection_for(Scope::Room, UserId(1)), None);
    }

    #[test]
    fn test_enter_replaces_existing_connection() {
        let presence = Presence::new();
        presence.enter(Scope::Room, UserId(1), conn(10));
        presence.enter(Scope::Room, UserId(1), conn(11));

        assert_eq!(presence.connection_for(Scope::Room, UserId(1)), Some(conn(11)));
        assert_eq!(presence.count(Scope::Room), 1);
    }

    #[test]
    fn test_exit_absent_user_is_noop() {
        let presence = Presence::new();
        presence.exit(Scope::Hall, UserId(3));
        assert_eq!(presence.count(Scope::Hall), 0);
    }

    #[test]
    fn test_exit_removes_only_that_scope() {
        let presence = Presence::new();
        presence.enter(Scope::Hall, UserId(1), conn(10));
        presence.enter(Scope::Room, UserId(1), conn(11));

        presence.exit(Scope::Hall, UserId(1));
        assert!(!presence.is_present(Scope::Hall, UserId(1)));
        assert!(presence.is_present(Scope::Room, UserId(1)));
    }

    #[test]
    fn test_scope_deserializes_from_lowercase() {
        let scope: Scope = serde_json::from_str("\"hall\"").unwrap();
        assert_eq!(scope, Scope::Hall);
        assert_eq!(Scope::Room.to_string(), "room");
    }
}
