//! User accounts and ladder scores.
//!
//! The game core only needs a handful of queries, captured by the
//! [`UserStore`] trait. [`MemoryUserStore`] implements it in process and
//! is what the shipped server and the tests use.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod user;

pub use error::StoreError;
pub use memory::MemoryUserStore;
pub use user::{Credentials, INITIAL_SCORE, SCORE_STEP, User};

use std::future::Future;

use gobang_protocol::UserId;

/// The queries the server makes against its user database.
///
/// Every call is a fresh read or write; callers never cache a [`User`].
/// Lookups return `Ok(None)` for "no such user" and reserve `Err` for the
/// store itself failing.
pub trait UserStore: Send + Sync + 'static {
    /// Creates a user with the starting score.
    ///
    /// # Errors
    /// [`StoreError::DuplicateUsername`] if the name is taken.
    fn insert(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;

    /// Returns the user if the username exists and the password matches.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn select_by_name(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn select_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Records a win: score +30, one more game, one more win.
    fn win(&self, id: UserId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Records a loss: score -30, one more game.
    fn lose(&self, id: UserId) -> impl Future<Output = Result<(), StoreError>> + Send;
}
