//! Matchmaking for the gobang server.
//!
//! Waiting users are split into three score tiers, each with its own FIFO
//! queue and its own worker task. A worker takes the two oldest entries
//! of its queue, checks that both users are still in the hall and asks
//! the room manager for a room.
//!
//! ```text
//! add(uid) ──→ [Normal] ──→ worker ──┐
//!          ──→ [High]   ──→ worker ──┼──→ RoomManager::create_room ──→ match_success
//!          ──→ [Super]  ──→ worker ──┘
//! ```

mod config;
mod error;
mod matchmaker;
mod queue;
mod tier;

pub use config::MatchConfig;
pub use error::MatchError;
pub use matchmaker::Matchmaker;
pub use queue::MatchQueue;
pub use tier::Tier;
