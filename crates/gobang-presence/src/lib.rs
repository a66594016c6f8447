//! Who is online, and how to reach them.
//!
//! [`Presence`] maps users to the connection they currently hold, once
//! for the game hall and once for game rooms. [`Outbox`] resolves a user
//! through that registry and pushes an encoded message into the
//! connection table.

mod error;
mod outbox;
mod registry;

pub use error::OutboxError;
pub use outbox::Outbox;
pub use registry::{Presence, Scope};
