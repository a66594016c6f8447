use gobang_protocol::{ProtocolError, UserId};
use gobang_transport::TransportError;

use crate::Scope;

/// Why a message could not be delivered. Callers log these; a failed
/// delivery never aborts the operation that produced the message.
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("user {uid} is not present in {scope}")]
    NotPresent { scope: Scope, uid: UserId },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
