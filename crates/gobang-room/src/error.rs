//! Error types for the room layer.

use gobang_presence::Scope;
use gobang_protocol::{RoomId, UserId};

/// Why a room could not be created.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A player is not connected in the scope rooms are created from.
    #[error("user {uid} is not present in {scope}")]
    NotPresent { uid: UserId, scope: Scope },

    /// Both seats were given the same user.
    #[error("user {0} cannot play against themselves")]
    SamePlayer(UserId),

    /// A player already has a room.
    #[error("user {0} already in room {1}")]
    AlreadyInRoom(UserId, RoomId),
}
