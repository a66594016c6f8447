//! One-shot scheduled callbacks.
//!
//! [`TimerService::schedule`] runs a closure once after a delay on the
//! tokio runtime and hands back a [`TimerHandle`]. Cancelling is
//! advisory: once the callback has started it runs to completion, and
//! `cancel` reports `false`.
//!
//! ```ignore
//! let timers = TimerService::new();
//! let handle = timers.schedule(Duration::from_secs(30), move |_id| {
//!     sessions.expire(ssid);
//! });
//! // later, the user did something:
//! handle.cancel();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::trace;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Unique id of a scheduled timer. Never reused by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    /// Timers that have neither fired nor been cancelled.
    pending: Mutex<HashMap<TimerId, AbortHandle>>,
}

/// Schedules one-shot callbacks. Cloning shares the same timer table.
#[derive(Debug, Clone, Default)]
pub struct TimerService {
    inner: Arc<Inner>,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `callback` once, `delay` from now. The callback receives the
    /// id of the timer that fired, so it can tell whether it is still the
    /// timer its owner cares about.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce(TimerId) + Send + 'static,
    {
        let id = TimerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let inner = Arc::clone(&self.inner);

        // The entry must exist before the task can possibly look for it.
        let mut pending = self.inner.pending.lock();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Claiming the entry is what makes this timer "started";
            // a cancel that got there first wins.
            if inner.pending.lock().remove(&id).is_none() {
                return;
            }
            trace!(%id, "timer fired");
            callback(id);
        });
        pending.insert(id, task.abort_handle());
        drop(pending);

        trace!(%id, delay_ms = delay.as_millis() as u64, "timer scheduled");
        TimerHandle {
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    /// How many timers have not yet fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.inner.pending.lock().len()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// A reference to one scheduled callback.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: TimerId,
    inner: Arc<Inner>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Stops the callback from running if it has not started yet.
    ///
    /// Returns `true` if this call prevented the callback, `false` if it
    /// had already fired (or is firing) or was cancelled before.
    pub fn cancel(&self) -> bool {
        match self.inner.pending.lock().remove(&self.id) {
            Some(task) => {
                task.abort();
                trace!(id = %self.id, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether the callback is still waiting to run.
    pub fn is_pending(&self) -> bool {
        self.inner.pending.lock().contains_key(&self.id)
    }
}

impl PartialEq for TimerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for TimerHandle {}
