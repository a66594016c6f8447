//! # Gobang
//!
//! An online five-in-a-row server.
//!
//! Players register and log in over HTTP, then open a `/hall` WebSocket
//! to queue for a match. Users of similar score are paired by the
//! matchmaker, which opens a room for them; both clients then connect to
//! `/room` and play on a 15x15 board until one side gets five in a row or
//! leaves. Wins and losses move the players' scores by 30 points.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gobang::prelude::*;
//!
//! # async fn start() -> Result<(), GobangError> {
//! let server = GobangServerBuilder::new()
//!     .http_addr("0.0.0.0:8080")
//!     .ws_addr("0.0.0.0:8081")
//!     .build(Arc::new(MemoryUserStore::new()))
//!     .await?;
//! server.run().await
//! # }
//! ```

pub mod accounts;
mod config;
mod error;
mod handler;
mod http;
mod server;

pub use config::AppConfig;
pub use error::GobangError;
pub use server::{GobangServer, GobangServerBuilder};

/// Everything needed to embed the server.
pub mod prelude {
    pub use crate::{AppConfig, GobangError, GobangServer, GobangServerBuilder};
    pub use gobang_match::{MatchConfig, Tier};
    pub use gobang_presence::Scope;
    pub use gobang_protocol::{GameRequest, GameResponse, OpType, RoomId, SessionId, UserId};
    pub use gobang_room::RoomConfig;
    pub use gobang_session::SessionConfig;
    pub use gobang_store::{Credentials, MemoryUserStore, User, UserStore};
}
