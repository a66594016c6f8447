//! Message types that travel between the game client and the server.
//!
//! Everything here is plain data with serde derives. The JSON shape is
//! flat on purpose: every message carries an `optype` string and a
//! handful of optional fields, and the browser client reads whichever
//! fields the `optype` implies.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A registered user's id, as assigned by the user store.
///
/// `#[serde(transparent)]` keeps it a bare number on the wire, so
/// `UserId(42)` is `42` in JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A game room's id. Allocated monotonically by the room manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A login session's id. This is the value carried in the `SSID` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// OpType
// ---------------------------------------------------------------------------

/// The `optype` values the server understands or emits.
///
/// Requests keep `optype` as a raw string so that an unrecognised value
/// can still be echoed back in an "unknown request type" reply instead
/// of failing to decode. [`OpType::parse`] classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    /// Place a stone. Client → room.
    PutChess,
    /// Send a chat line. Client → room.
    Chat,
    /// Enter the matchmaking queue. Client → hall.
    MatchStart,
    /// Leave the matchmaking queue. Client → hall.
    MatchStop,
    /// Server → client after a hall connection is accepted or refused.
    HallReady,
    /// Server → client after a room connection is accepted or refused.
    RoomReady,
    /// Server → client when the matchmaker has created a room.
    MatchSuccess,
    /// Anything else.
    Unknown,
}

impl OpType {
    /// Classifies a wire `optype` string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "put_chess" => Self::PutChess,
            "chat" => Self::Chat,
            "match_start" => Self::MatchStart,
            "match_stop" => Self::MatchStop,
            "hall_ready" => Self::HallReady,
            "room_ready" => Self::RoomReady,
            "match_success" => Self::MatchSuccess,
            _ => Self::Unknown,
        }
    }

    /// The wire spelling. `Unknown` has none and maps to `"unknown"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PutChess => "put_chess",
            Self::Chat => "chat",
            Self::MatchStart => "match_start",
            Self::MatchStop => "match_stop",
            Self::HallReady => "hall_ready",
            Self::RoomReady => "room_ready",
            Self::MatchSuccess => "match_success",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A request sent on a room connection: a move or a chat line.
///
/// `room_id` and `uid` are required; `row`/`col` only matter for
/// `put_chess` and `message` only for `chat`. Missing optional fields
/// decode as `None` and are rejected later by the room with a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRequest {
    pub optype: String,
    pub room_id: RoomId,
    pub uid: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GameRequest {
    /// Builds a `put_chess` request.
    pub fn put_chess(room_id: RoomId, uid: UserId, row: i32, col: i32) -> Self {
        Self {
            optype: OpType::PutChess.as_str().to_string(),
            room_id,
            uid,
            row: Some(row),
            col: Some(col),
            message: None,
        }
    }

    /// Builds a `chat` request.
    pub fn chat(room_id: RoomId, uid: UserId, message: impl Into<String>) -> Self {
        Self {
            optype: OpType::Chat.as_str().to_string(),
            room_id,
            uid,
            row: None,
            col: None,
            message: Some(message.into()),
        }
    }

    pub fn op(&self) -> OpType {
        OpType::parse(&self.optype)
    }
}

/// A request sent on a hall connection. Only the `optype` matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallRequest {
    pub optype: String,
}

impl HallRequest {
    pub fn op(&self) -> OpType {
        OpType::parse(&self.optype)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Every message the server pushes to a client.
///
/// Game replies echo the request's fields (`room_id`, `uid`, `row`,
/// `col`, `message`) so the client can render the move or chat line
/// straight from the broadcast. `winner` is always present and uses
/// `0` for "nobody has won".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResponse {
    pub optype: String,
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, with = "winner_field")]
    pub winner: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_id: Option<UserId>,
}

impl GameResponse {
    fn bare(optype: impl Into<String>, result: bool) -> Self {
        Self {
            optype: optype.into(),
            result,
            reason: None,
            room_id: None,
            uid: None,
            row: None,
            col: None,
            message: None,
            winner: None,
            white_id: None,
            black_id: None,
        }
    }

    /// A successful reply with no extra fields.
    pub fn success(optype: impl Into<String>) -> Self {
        Self::bare(optype, true)
    }

    /// A failed reply carrying a human-readable reason.
    pub fn failure(optype: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::bare(optype, false).with_reason(reason)
    }

    /// A reply that echoes the request's fields. `result` starts `false`;
    /// the handler flips it once the request is accepted.
    pub fn echo(req: &GameRequest) -> Self {
        Self {
            room_id: Some(req.room_id),
            uid: Some(req.uid),
            row: req.row,
            col: req.col,
            message: req.message.clone(),
            ..Self::bare(req.optype.clone(), false)
        }
    }

    pub fn with_result(mut self, result: bool) -> Self {
        self.result = result;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_winner(mut self, winner: Option<UserId>) -> Self {
        self.winner = winner;
        self
    }

    pub fn with_uid(mut self, uid: UserId) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Fills in the room description sent with `room_ready`.
    pub fn with_room(mut self, room_id: RoomId, white: UserId, black: UserId) -> Self {
        self.room_id = Some(room_id);
        self.white_id = Some(white);
        self.black_id = Some(black);
        self
    }

    pub fn op(&self) -> OpType {
        OpType::parse(&self.optype)
    }
}

/// `winner` is `0` on the wire when nobody has won.
mod winner_field {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::UserId;

    pub fn serialize<S: Serializer>(
        winner: &Option<UserId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(winner.map_or(0, |id| id.0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<UserId>, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        Ok((raw != 0).then_some(UserId(raw)))
    }
}

// =========================================================================
// Tests
// =========================================================================
