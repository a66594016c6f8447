//! Room configuration and status.

use gobang_presence::Scope;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a manager creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Chat lines containing any of these substrings are rejected.
    pub banned_words: Vec<String>,

    /// Where both players must be present for `create_room` to succeed.
    ///
    /// Defaults to [`Scope::Room`]. Matched players are normally still on
    /// their hall connection at that point, so a server that creates rooms
    /// from the matchmaker sets this to [`Scope::Hall`].
    pub eligibility_scope: Scope,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            banned_words: vec!["垃圾".to_string()],
            eligibility_scope: Scope::Room,
        }
    }
}

impl RoomConfig {
    /// Whether `message` contains a banned word.
    pub fn is_banned(&self, message: &str) -> bool {
        self.banned_words
            .iter()
            .any(|word| !word.is_empty() && message.contains(word.as_str()))
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// Active ──(five in a row / forfeit)──→ Over
/// ```
///
/// `Over` is terminal: the board and status never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Active,
    Over,
}

impl RoomStatus {
    pub fn is_over(self) -> bool {
        matches!(self, Self::Over)
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Over => write!(f, "Over"),
        }
    }
}
