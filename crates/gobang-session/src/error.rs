//! Error types for the session layer.

use gobang_protocol::SessionId;

/// Why a request could not be tied to a live session. Every variant
/// means the client has to log in again.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The request carried no `Cookie` header.
    #[error("no cookie found, please log in again")]
    MissingCookie,

    /// A cookie was sent but it has no usable `SSID` entry.
    #[error("no session id in cookie, please log in again")]
    MissingSsid,

    /// The ssid is unknown, most likely because the session expired.
    #[error("session {0} not found, please log in again")]
    NotFound(SessionId),
}
