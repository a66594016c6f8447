use gobang_protocol::UserId;

/// Errors returned by a [`UserStore`](crate::UserStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `insert` with a username that already exists.
    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    /// `win`/`lose` for an id the store does not know.
    #[error("unknown user {0}")]
    UnknownUser(UserId),

    /// The backing store could not be reached.
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}
