//! Expiry behaviour of the session manager.
//!
//! Runs on tokio's paused clock: sleeping in a test advances virtual
//! time and lets every due timer fire first.

use std::time::Duration;

use gobang_protocol::UserId;
use gobang_session::{Expiry, SESSION_TIMEOUT, SessionConfig, SessionManager, SessionStatus};

// =========================================================================
// Helpers
// =========================================================================

fn manager() -> SessionManager {
    SessionManager::new(SessionConfig::default())
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// =========================================================================
// Finite expiry
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_set_expiry_after_removes_session_when_due() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(5000)));
    assert!(mgr.has_timer(ssid));

    advance(4999).await;
    assert!(mgr.get_session(ssid).is_some(), "should survive until due");

    advance(2).await;
    assert!(mgr.get_session(ssid).is_none(), "should be removed when due");
}

#[tokio::test(start_paused = true)]
async fn test_set_default_expiry_uses_session_timeout() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_default_expiry(ssid);

    advance(SESSION_TIMEOUT.as_millis() as u64 - 1).await;
    assert!(mgr.get_session(ssid).is_some());
    advance(2).await;
    assert!(mgr.get_session(ssid).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_set_expiry_after_twice_refreshes_deadline() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(1000)));
    advance(800).await;
    // Refresh: the old 1000 ms timer must not remove the session.
    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(1000)));

    advance(500).await;
    assert!(mgr.get_session(ssid).is_some(), "old timer should be stale");
    assert!(mgr.has_timer(ssid));

    advance(600).await;
    assert!(mgr.get_session(ssid).is_none(), "new timer should expire it");
}

// =========================================================================
// Forever
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_set_expiry_forever_cancels_pending_removal() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(100)));
    mgr.set_expiry(ssid, Expiry::Forever);
    assert!(!mgr.has_timer(ssid));

    advance(10_000).await;
    assert!(mgr.get_session(ssid).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_forever_then_finite_then_forever_leaves_no_timer() {
    let mgr = manager();
    let session = mgr.create_session(UserId(1), SessionStatus::Login);
    let ssid = session.ssid;

    mgr.set_expiry(ssid, Expiry::Forever);
    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(5000)));
    mgr.set_expiry(ssid, Expiry::Forever);

    assert!(!mgr.has_timer(ssid));
    advance(60_000).await;
    assert_eq!(mgr.get_session(ssid), Some(session));
    assert!(!mgr.has_timer(ssid));
}

// =========================================================================
// Re-insertion
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_reinsert_does_not_duplicate_present_session() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(100)));
    mgr.set_expiry(ssid, Expiry::Forever);
    advance(1).await;

    assert_eq!(mgr.len(), 1);
    assert!(!mgr.has_timer(ssid));
}

#[tokio::test(start_paused = true)]
async fn test_removed_session_stays_removed_after_timer_due() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(100)));
    assert!(mgr.remove_session(ssid));

    advance(200).await;
    assert!(mgr.get_session(ssid).is_none());
    assert!(mgr.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_remove_session_after_refreshed_expiry_stays_removed() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(5000)));
    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(5000)));
    assert!(mgr.remove_session(ssid));

    advance(60_000).await;
    assert!(mgr.get_session(ssid).is_none());
    assert!(!mgr.has_timer(ssid));
    assert!(mgr.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_remove_session_after_switch_to_forever_stays_removed() {
    let mgr = manager();
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_expiry(ssid, Expiry::After(Duration::from_millis(5000)));
    mgr.set_expiry(ssid, Expiry::Forever);
    assert!(mgr.remove_session(ssid));

    advance(60_000).await;
    assert!(mgr.get_session(ssid).is_none());
    assert!(mgr.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_of_one_session_leaves_others() {
    let mgr = manager();
    let short = mgr.create_session(UserId(1), SessionStatus::Login).ssid;
    let long = mgr.create_session(UserId(2), SessionStatus::Login).ssid;

    mgr.set_expiry(short, Expiry::After(Duration::from_millis(100)));
    mgr.set_expiry(long, Expiry::After(Duration::from_millis(1000)));

    advance(200).await;
    assert!(mgr.get_session(short).is_none());
    assert!(mgr.get_session(long).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_custom_config_timeout_is_used() {
    let mgr = SessionManager::new(SessionConfig {
        timeout: Duration::from_millis(50),
    });
    let ssid = mgr.create_session(UserId(1), SessionStatus::Login).ssid;

    mgr.set_default_expiry(ssid);
    advance(60).await;
    assert!(mgr.get_session(ssid).is_none());
}
