//! The session manager: the table of live sessions and their expiry
//! timers.
//!
//! # Timer ordering
//!
//! Every change to a session's timer goes through the table lock, and
//! each entry remembers which timer currently owns its expiry. A removal
//! callback that was already running when its timer was cancelled finds
//! a different timer (or none) recorded and leaves the session alone.
//! Cancelling a scheduled timer additionally queues a zero-delay
//! re-insertion of the session snapshot, which only inserts if the ssid
//! has gone missing in between.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use gobang_protocol::{SessionId, UserId};
use gobang_timer::{TimerHandle, TimerId, TimerService};
use parking_lot::Mutex;

use crate::{Expiry, Session, SessionConfig, SessionError, SessionStatus, ssid_from_cookie};

/// Whether a session currently has a removal scheduled.
#[derive(Debug, Clone)]
enum TimerState {
    NoTimer,
    Scheduled(TimerHandle),
}

#[derive(Debug)]
struct Entry {
    session: Session,
    timer: TimerState,
    /// Zero-delay re-insertion queued by the last timer replacement.
    reinsert: Option<TimerHandle>,
}

impl Entry {
    fn new(session: Session, timer: TimerState) -> Self {
        Self {
            session,
            timer,
            reinsert: None,
        }
    }

    fn cancel_timers(&mut self) {
        if let TimerState::Scheduled(timer) = &self.timer {
            timer.cancel();
        }
        if let Some(reinsert) = self.reinsert.take() {
            reinsert.cancel();
        }
    }
}

#[derive(Debug)]
struct Shared {
    table: Mutex<HashMap<SessionId, Entry>>,
    next_ssid: AtomicU64,
    timers: TimerService,
    config: SessionConfig,
}

/// Creates, looks up and expires login sessions.
///
/// Cheap to clone; clones share the same table. Timer callbacks hold a
/// weak reference, so dropping the last manager also retires any timers
/// still pending.
#[derive(Debug, Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_timers(config, TimerService::new())
    }

    /// Uses an existing timer service instead of creating one.
    pub fn with_timers(config: SessionConfig, timers: TimerService) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(HashMap::new()),
                next_ssid: AtomicU64::new(1),
                timers,
                config,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Creates a session for `user_id` with no expiry timer.
    pub fn create_session(&self, user_id: UserId, status: SessionStatus) -> Session {
        let ssid = SessionId(self.shared.next_ssid.fetch_add(1, Ordering::Relaxed));
        let session = Session {
            ssid,
            user_id,
            status,
        };
        self.shared
            .table
            .lock()
            .insert(ssid, Entry::new(session.clone(), TimerState::NoTimer));
        tracing::info!(%ssid, %user_id, ?status, "session created");
        session
    }

    pub fn get_session(&self, ssid: SessionId) -> Option<Session> {
        self.shared
            .table
            .lock()
            .get(&ssid)
            .map(|entry| entry.session.clone())
    }

    /// Resolves a raw `Cookie` header to its session.
    ///
    /// # Errors
    /// [`SessionError::MissingCookie`], [`SessionError::MissingSsid`] or
    /// [`SessionError::NotFound`], each meaning "log in again".
    pub fn session_from_cookie(&self, cookie: Option<&str>) -> Result<Session, SessionError> {
        let cookie = cookie.ok_or(SessionError::MissingCookie)?;
        let ssid = ssid_from_cookie(cookie).ok_or(SessionError::MissingSsid)?;
        self.get_session(ssid).ok_or(SessionError::NotFound(ssid))
    }

    /// Deletes a session and cancels its timer. Returns whether it existed.
    pub fn remove_session(&self, ssid: SessionId) -> bool {
        let removed = self.shared.table.lock().remove(&ssid);
        match removed {
            Some(mut entry) => {
                entry.cancel_timers();
                tracing::info!(%ssid, "session removed");
                true
            }
            None => false,
        }
    }

    /// Changes the expiry policy of a session. Unknown ssids are ignored.
    pub fn set_expiry(&self, ssid: SessionId, expiry: Expiry) {
        let mut table = self.shared.table.lock();
        let Some(entry) = table.get_mut(&ssid) else {
            tracing::debug!(%ssid, "set_expiry on unknown session ignored");
            return;
        };

        let previous = std::mem::replace(&mut entry.timer, TimerState::NoTimer);
        match (previous, expiry) {
            (TimerState::NoTimer, Expiry::Forever) => {}
            (TimerState::NoTimer, Expiry::After(delay)) => {
                entry.timer = TimerState::Scheduled(self.schedule_removal(ssid, delay));
            }
            (TimerState::Scheduled(old), Expiry::Forever) => {
                old.cancel();
                let reinsert = self.schedule_reinsert(entry.session.clone(), TimerState::NoTimer);
                replace_reinsert(entry, reinsert);
            }
            (TimerState::Scheduled(old), Expiry::After(delay)) => {
                old.cancel();
                let timer = TimerState::Scheduled(self.schedule_removal(ssid, delay));
                let reinsert = self.schedule_reinsert(entry.session.clone(), timer.clone());
                replace_reinsert(entry, reinsert);
                entry.timer = timer;
            }
        }
        tracing::debug!(%ssid, ?expiry, "session expiry set");
    }

    /// Applies the configured finite timeout.
    pub fn set_default_expiry(&self, ssid: SessionId) {
        self.set_expiry(ssid, Expiry::After(self.shared.config.timeout));
    }

    /// Whether a removal is currently scheduled for `ssid`.
    pub fn has_timer(&self, ssid: SessionId) -> bool {
        matches!(
            self.shared.table.lock().get(&ssid),
            Some(Entry {
                timer: TimerState::Scheduled(_),
                ..
            })
        )
    }

    pub fn len(&self) -> usize {
        self.shared.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.table.lock().is_empty()
    }

    // -- Timer callbacks --------------------------------------------------

    fn schedule_removal(&self, ssid: SessionId, delay: Duration) -> TimerHandle {
        let shared = Arc::downgrade(&self.shared);
        self.shared
            .timers
            .schedule(delay, move |fired| expire(&shared, ssid, fired))
    }

    fn schedule_reinsert(&self, session: Session, timer: TimerState) -> TimerHandle {
        let shared = Arc::downgrade(&self.shared);
        self.shared
            .timers
            .schedule(Duration::ZERO, move |_| reinsert(&shared, session, timer))
    }
}

fn replace_reinsert(entry: &mut Entry, reinsert: TimerHandle) {
    if let Some(previous) = entry.reinsert.replace(reinsert) {
        previous.cancel();
    }
}

/// Removal callback. Only the timer recorded on the entry may remove it.
fn expire(shared: &Weak<Shared>, ssid: SessionId, fired: TimerId) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut table = shared.table.lock();
    let owns_expiry = matches!(
        table.get(&ssid),
        Some(Entry { timer: TimerState::Scheduled(current), .. }) if current.id() == fired
    );
    if owns_expiry {
        table.remove(&ssid);
        tracing::info!(%ssid, "session expired");
    } else {
        tracing::debug!(%ssid, timer = %fired, "stale expiry timer ignored");
    }
}

/// Re-insertion callback. Never overwrites a present entry.
fn reinsert(shared: &Weak<Shared>, session: Session, timer: TimerState) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let ssid = session.ssid;
    // A removal timer cancelled in the meantime means the session was
    // deleted on purpose.
    if let TimerState::Scheduled(handle) = &timer {
        if !handle.is_pending() {
            tracing::debug!(%ssid, "re-insertion skipped, removal timer gone");
            return;
        }
    }
    let mut table = shared.table.lock();
    if !table.contains_key(&ssid) {
        table.insert(ssid, Entry::new(session, timer));
        tracing::debug!(%ssid, "session re-inserted after timer cancel");
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Table operations. Expiry timing lives in `tests/session_expiry.rs`.

    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(SessionConfig::default())
    }

    // =====================================================================
    // create_session() / get_session()
    // =====================================================================

    #[test]
    fn test_create_session_returns_login_session_without_timer() {
        let mgr = manager();
        let session = mgr.create_session(UserId(5), SessionStatus::Login);

        assert_eq!(session.user_id, UserId(5));
        assert!(session.is_login());
        assert!(!mgr.has_timer(session.ssid));
        assert_eq!(mgr.get_session(session.ssid), Some(session));
    }

    #[test]
    fn test_create_session_ssids_are_monotonic() {
        let mgr = manager();
        let a = mgr.create_session(UserId(1), SessionStatus::Login);
        let b = mgr.create_session(UserId(1), SessionStatus::Login);

        assert!(b.ssid.0 > a.ssid.0);
        assert_eq!(mgr.len(), 2);
    }

    #[test]
    fn test_get_session_unknown_returns_none() {
        assert_eq!(manager().get_session(SessionId(404)), None);
    }

    // =====================================================================
    // remove_session()
    // =====================================================================

    #[test]
    fn test_remove_session_is_idempotent() {
        let mgr = manager();
        let session = mgr.create_session(UserId(1), SessionStatus::Login);

        assert!(mgr.remove_session(session.ssid));
        assert!(!mgr.remove_session(session.ssid));
        assert!(mgr.is_empty());
    }

    // =====================================================================
    // set_expiry() without a runtime-visible timer
    // =====================================================================

    #[test]
    fn test_set_expiry_forever_without_timer_is_noop() {
        let mgr = manager();
        let session = mgr.create_session(UserId(1), SessionStatus::Login);

        mgr.set_expiry(session.ssid, Expiry::Forever);
        assert!(!mgr.has_timer(session.ssid));
        assert!(mgr.get_session(session.ssid).is_some());
    }

    #[test]
    fn test_set_expiry_unknown_ssid_is_noop() {
        let mgr = manager();
        mgr.set_expiry(SessionId(9), Expiry::Forever);
        assert!(mgr.is_empty());
    }

    // =====================================================================
    // session_from_cookie()
    // =====================================================================

    #[test]
    fn test_session_from_cookie_resolves_live_session() {
        let mgr = manager();
        let session = mgr.create_session(UserId(3), SessionStatus::Login);
        let cookie = format!("SSID={}", session.ssid.0);

        let found = mgr.session_from_cookie(Some(&cookie)).unwrap();
        assert_eq!(found, session);
    }

    #[test]
    fn test_session_from_cookie_missing_header_errors() {
        let result = manager().session_from_cookie(None);
        assert!(matches!(result, Err(SessionError::MissingCookie)));
    }

    #[test]
    fn test_session_from_cookie_without_ssid_errors() {
        let result = manager().session_from_cookie(Some("theme=dark"));
        assert!(matches!(result, Err(SessionError::MissingSsid)));
    }

    #[test]
    fn test_session_from_cookie_unknown_ssid_errors() {
        let result = manager().session_from_cookie(Some("SSID=77"));
        assert!(matches!(result, Err(SessionError::NotFound(SessionId(77)))));
    }
}
