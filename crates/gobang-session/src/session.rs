//! Session types.

use std::time::Duration;

use gobang_protocol::{SessionId, UserId};

/// How long a session lives without a connection: 30 seconds.
pub const SESSION_TIMEOUT: Duration = Duration::from_millis(30_000);

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The finite expiry applied at login and whenever the user's last
    /// connection closes.
    ///
    /// Default: [`SESSION_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: SESSION_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus / Expiry
// ---------------------------------------------------------------------------

/// Whether the session belongs to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unlogin,
    Login,
}

/// The expiry policy passed to
/// [`SessionManager::set_expiry`](crate::SessionManager::set_expiry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Never expire. Used while the user holds a WebSocket.
    Forever,
    /// Remove the session after this long, unless the expiry is changed
    /// again first.
    After(Duration),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of one session. Handed out by value; the manager keeps
/// the authoritative copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub ssid: SessionId,
    pub user_id: UserId,
    pub status: SessionStatus,
}

impl Session {
    pub fn is_login(&self) -> bool {
        self.status == SessionStatus::Login
    }
}
