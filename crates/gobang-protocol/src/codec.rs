//! Encoding messages to bytes and back.
//!
//! Handlers never call `serde_json` directly; they hold a [`Codec`] so
//! the frame format stays in one place.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts serde types to bytes and back.
///
/// `Send + Sync + 'static` because a codec is shared by every
/// connection task the server spawns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do
    /// not match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`. The browser client speaks JSON,
/// so this is the only codec the server ships with.
///
/// ```rust
/// use gobang_protocol::{Codec, GameRequest, JsonCodec, RoomId, UserId};
///
/// let codec = JsonCodec;
/// let req = GameRequest::chat(RoomId(1), UserId(2), "good game");
///
/// let bytes = codec.encode(&req).unwrap();
/// let decoded: GameRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(req, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{GameRequest, HallRequest, OpType};

    #[test]
    fn test_decode_malformed_json_returns_decode_error() {
        let result: Result<HallRequest, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_hall_request() {
        let req: HallRequest = JsonCodec.decode(br#"{"optype":"match_stop"}"#).unwrap();
        assert_eq!(req.op(), OpType::MatchStop);
    }

    #[test]
    fn test_decode_request_with_unknown_optype_still_succeeds() {
        let req: GameRequest = JsonCodec
            .decode(br#"{"optype":"undo","room_id":1,"uid":2}"#)
            .unwrap();
        assert_eq!(req.op(), OpType::Unknown);
        assert_eq!(req.optype, "undo");
    }
}
