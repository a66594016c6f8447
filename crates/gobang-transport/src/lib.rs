//! Byte-level plumbing between the gobang server and its clients.
//!
//! A [`Transport`] yields accepted sockets, each one a [`Connection`]
//! tagged with a process-wide [`ConnectionId`]. The WebSocket backend
//! keeps the upgrade path and `Cookie` header so the server can route
//! `/hall` and `/room` sockets and find the caller's session.
//! Components that hold an id but not the socket write through the
//! [`ConnectionTable`].
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] on `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod table;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use table::ConnectionTable;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// Shared by every transport and table in the process so ids never collide.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_connection_id() -> ConnectionId {
    ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// Names one live socket in logs and in the presence registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Listener side: hands out one [`Connection`] per client.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// One client socket carrying whole messages.
///
/// `send` and `recv` lock different halves, so a reader task and a
/// writer task can share the connection.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Next message payload, or `Ok(None)` once the peer has closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
