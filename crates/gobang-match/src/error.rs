use gobang_protocol::UserId;
use gobang_store::StoreError;

/// Errors from `add`/`remove`. Nothing is queued or dequeued when one is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The score lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store has no such user.
    #[error("unknown user {0}")]
    UnknownUser(UserId),
}
