use gobang_protocol::UserId;
use serde::{Deserialize, Serialize};

/// Score given to a newly registered user.
pub const INITIAL_SCORE: i64 = 1000;

/// Points gained on a win and lost on a loss.
pub const SCORE_STEP: i64 = 30;

/// A registered user as the store reports it. The password digest never
/// leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub score: i64,
    pub total_count: u32,
    pub win_count: u32,
}

/// A username/password pair, as posted to `/reg` and `/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
