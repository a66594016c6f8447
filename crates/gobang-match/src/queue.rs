//! One tier's waiting line.

use std::collections::VecDeque;

use gobang_protocol::UserId;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// A FIFO of user ids with a wake-up signal for its worker.
///
/// A user appears at most once. The lock is never held across an
/// `.await`; [`next_pair`](Self::next_pair) re-checks the "at least two
/// entries" predicate after every wake-up.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: Mutex<VecDeque<UserId>>,
    wakeup: Notify,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `uid` at the tail and wakes the worker. Returns `false`
    /// (and changes nothing) if `uid` is already queued.
    pub fn push(&self, uid: UserId) -> bool {
        {
            let mut entries = self.entries.lock();
            if entries.contains(&uid) {
                return false;
            }
            entries.push_back(uid);
        }
        self.wakeup.notify_one();
        true
    }

    /// Deletes `uid` wherever it is. Returns whether it was queued.
    pub fn remove(&self, uid: UserId) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|&queued| queued == uid) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, uid: UserId) -> bool {
        self.entries.lock().contains(&uid)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Pops the two oldest entries if there are at least two.
    pub fn try_pop_pair(&self) -> Option<(UserId, UserId)> {
        let mut entries = self.entries.lock();
        if entries.len() < 2 {
            return None;
        }
        let a = entries.pop_front()?;
        let b = entries.pop_front()?;
        Some((a, b))
    }

    /// Waits until two users are queued and pops them.
    ///
    /// Cancel-safe: entries are only taken inside a single poll, so
    /// dropping this future never loses a user.
    pub async fn next_pair(&self) -> (UserId, UserId) {
        loop {
            if let Some(pair) = self.try_pop_pair() {
                return pair;
            }
            self.wakeup.notified().await;
        }
    }
}
