//! Error types for the protocol layer.

/// Errors raised while turning messages into bytes or back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes were not valid JSON, or did not match the message shape
    /// (missing `room_id`, wrong field type, truncated frame).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but is not something the endpoint accepts,
    /// e.g. a binary frame where text was expected.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
