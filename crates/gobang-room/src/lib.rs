//! Game rooms for the gobang server.
//!
//! A [`Room`] owns one game: the two players, the board and whether the
//! game is still running. It applies moves and chat lines and pushes the
//! results to both players. The [`RoomManager`] allocates room ids and
//! keeps the room and user indices in step.
//!
//! # Key types
//!
//! - [`RoomManager`] — creates/removes rooms, finds a user's room
//! - [`Room`] — per-game state machine, shared as `Arc<Room<S>>`
//! - [`Board`] — the 15×15 grid and the win check
//! - [`RoomConfig`] — banned chat words, room eligibility scope

mod board;
mod config;
mod error;
mod manager;
mod room;

pub use board::{BOARD_SIZE, Board, Stone};
pub use config::{RoomConfig, RoomStatus};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::Room;
