//! Unified error type for the gobang server.

use gobang_match::MatchError;
use gobang_presence::OutboxError;
use gobang_protocol::ProtocolError;
use gobang_room::RoomError;
use gobang_session::SessionError;
use gobang_store::StoreError;
use gobang_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum GobangError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Outbox(#[from] OutboxError),

    /// Binding or serving the HTTP listener failed.
    #[error("http server error: {0}")]
    Http(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use gobang_protocol::{SessionId, UserId};

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let gobang_err: GobangError = err.into();
        assert!(matches!(gobang_err, GobangError::Transport(_)));
        assert!(gobang_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_session_error_keeps_message() {
        let err = SessionError::NotFound(SessionId(9));
        let gobang_err: GobangError = err.into();
        assert!(matches!(gobang_err, GobangError::Session(_)));
        assert!(gobang_err.to_string().contains("log in again"));
    }

    #[test]
    fn test_from_store_error() {
        let err = StoreError::DuplicateUsername("alice".into());
        let gobang_err: GobangError = err.into();
        assert!(matches!(gobang_err, GobangError::Store(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::SamePlayer(UserId(1));
        let gobang_err: GobangError = err.into();
        assert!(matches!(gobang_err, GobangError::Room(_)));
    }

    #[test]
    fn test_from_io_error_is_http() {
        let err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken");
        let gobang_err: GobangError = err.into();
        assert!(matches!(gobang_err, GobangError::Http(_)));
        assert!(gobang_err.to_string().contains("taken"));
    }
}
