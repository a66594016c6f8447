//! Wire protocol for the gobang server.
//!
//! - **Types** ([`GameRequest`], [`HallRequest`], [`GameResponse`],
//!   [`OpType`]) are the JSON messages exchanged over the hall and room
//!   WebSocket endpoints.
//! - **Ids** ([`UserId`], [`RoomId`], [`SessionId`]) are the newtypes
//!   every other crate keys its tables by.
//! - **Codec** ([`Codec`], [`JsonCodec`]) turns those messages into bytes.
//!
//! ```text
//! Transport (frames) → Protocol (GameRequest) → Room / Matchmaker
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    GameRequest, GameResponse, HallRequest, OpType, RoomId, SessionId, UserId,
};
