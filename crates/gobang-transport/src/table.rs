//! Outbound delivery by connection id.
//!
//! Connection handlers own their socket. Everyone else (rooms, the
//! matchmaker) only has a [`ConnectionId`] from the presence registry, so
//! each handler registers an outbound channel here and drains it into
//! its socket.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{ConnectionId, TransportError, next_connection_id};

/// Maps live connections to the sending side of their outbound queue.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    outbound: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<Vec<u8>>>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id for a connection that did not come from a
    /// transport, e.g. an in-process client. Shares the counter the
    /// WebSocket transport uses, so ids never collide.
    pub fn allocate_id(&self) -> ConnectionId {
        next_connection_id()
    }

    /// Registers `id` and returns the receiver its handler should drain.
    /// Registering the same id again replaces the previous channel.
    pub fn register(&self, id: ConnectionId) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.outbound.lock().insert(id, tx);
        tracing::debug!(%id, "connection registered");
        rx
    }

    /// Forgets `id`. Messages already queued can still be drained; the
    /// receiver then sees the end of the stream.
    pub fn unregister(&self, id: ConnectionId) {
        if self.outbound.lock().remove(&id).is_some() {
            tracing::debug!(%id, "connection unregistered");
        }
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.outbound.lock().contains_key(&id)
    }

    /// Queues `data` for delivery on `id`.
    ///
    /// # Errors
    /// `UnknownConnection` if `id` is not registered, `ConnectionClosed`
    /// if its handler has already dropped the receiver.
    pub fn send(&self, id: ConnectionId, data: Vec<u8>) -> Result<(), TransportError> {
        let tx = self
            .outbound
            .lock()
            .get(&id)
            .cloned()
            .ok_or(TransportError::UnknownConnection(id))?;
        tx.send(data)
            .map_err(|_| TransportError::ConnectionClosed(id.to_string()))
    }
}
