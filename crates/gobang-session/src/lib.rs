//! Login sessions for the gobang server.
//!
//! A session is created when a user logs in over HTTP and is identified
//! by the `SSID` cookie afterwards. While the user has a live WebSocket
//! the session never expires; otherwise it is removed after a finite
//! timeout unless something refreshes it.
//!
//! ```text
//! login ──→ After(30s) ──(ws open)──→ Forever ──(ws close)──→ After(30s)
//!               │                                                 │
//!               └───────────(timer fires)──→ removed ←────────────┘
//! ```

mod cookie;
mod error;
mod manager;
mod session;

pub use cookie::{SSID_COOKIE, ssid_from_cookie};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Expiry, SESSION_TIMEOUT, Session, SessionConfig, SessionStatus};
