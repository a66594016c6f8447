//! Encodes a [`GameResponse`] and writes it to a user's current
//! connection in the requested scope.

use std::sync::Arc;

use gobang_protocol::{Codec, GameResponse, JsonCodec, UserId};
use gobang_transport::{ConnectionId, ConnectionTable};

use crate::{OutboxError, Presence, Scope};

/// Delivers server messages to users by id.
///
/// Cloning is cheap and shares the registry and connection table.
#[derive(Debug, Clone)]
pub struct Outbox {
    presence: Arc<Presence>,
    connections: Arc<ConnectionTable>,
    codec: JsonCodec,
}

impl Outbox {
    pub fn new(presence: Arc<Presence>, connections: Arc<ConnectionTable>) -> Self {
        Self {
            presence,
            connections,
            codec: JsonCodec,
        }
    }

    pub fn presence(&self) -> &Arc<Presence> {
        &self.presence
    }

    pub fn connections(&self) -> &Arc<ConnectionTable> {
        &self.connections
    }

    /// Sends `message` to `uid`'s connection in `scope`.
    ///
    /// # Errors
    /// [`OutboxError::NotPresent`] when the user has no connection in
    /// that scope; transport errors when the connection is gone.
    pub fn send(&self, scope: Scope, uid: UserId, message: &GameResponse) -> Result<(), OutboxError> {
        let conn = self
            .presence
            .connection_for(scope, uid)
            .ok_or(OutboxError::NotPresent { scope, uid })?;
        self.send_to(conn, message)
    }

    /// Sends `message` straight to a connection, bypassing presence.
    /// Used to answer a connection that is not (or no longer) registered.
    pub fn send_to(&self, conn: ConnectionId, message: &GameResponse) -> Result<(), OutboxError> {
        let bytes = self.codec.encode(message)?;
        self.connections.send(conn, bytes)?;
        Ok(())
    }
}
