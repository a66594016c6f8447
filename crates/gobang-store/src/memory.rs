//! In-process [`UserStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use gobang_protocol::UserId;
use parking_lot::Mutex;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::{Credentials, INITIAL_SCORE, SCORE_STEP, StoreError, User, UserStore};

/// User store held entirely in memory.
///
/// Passwords are kept as `SHA-256(salt || password)` with a random
/// 16-byte salt per user.
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
    /// When set, every call fails with [`StoreError::Unavailable`].
    unavailable: AtomicBool,
}

struct Inner {
    users: HashMap<UserId, Record>,
    by_name: HashMap<String, UserId>,
    next_id: u64,
}

struct Record {
    user: User,
    salt: [u8; 16],
    digest: [u8; 32],
}

fn digest(salt: &[u8; 16], password: &str) -> [u8; 32] {
    Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .into()
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                users: HashMap::new(),
                by_name: HashMap::new(),
                next_id: 1,
            }),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Overwrites a user's score. Returns `false` for unknown ids.
    pub fn set_score(&self, id: UserId, score: i64) -> bool {
        match self.inner.lock().users.get_mut(&id) {
            Some(record) => {
                record.user.score = score;
                true
            }
            None => false,
        }
    }

    /// Simulates the backing database going away (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }

    fn update(&self, id: UserId, apply: impl FnOnce(&mut User)) -> Result<(), StoreError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        let record = inner
            .users
            .get_mut(&id)
            .ok_or(StoreError::UnknownUser(id))?;
        apply(&mut record.user);
        Ok(())
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryUserStore {
    async fn insert(&self, credentials: &Credentials) -> Result<User, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        if inner.by_name.contains_key(&credentials.username) {
            return Err(StoreError::DuplicateUsername(credentials.username.clone()));
        }

        let id = UserId(inner.next_id);
        inner.next_id += 1;

        let salt: [u8; 16] = rand::rng().random();
        let user = User {
            id,
            username: credentials.username.clone(),
            score: INITIAL_SCORE,
            total_count: 0,
            win_count: 0,
        };
        inner.by_name.insert(user.username.clone(), id);
        inner.users.insert(
            id,
            Record {
                user: user.clone(),
                salt,
                digest: digest(&salt, &credentials.password),
            },
        );
        tracing::info!(%id, username = %user.username, "user registered");
        Ok(user)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock();
        let record = inner
            .by_name
            .get(&credentials.username)
            .and_then(|id| inner.users.get(id));
        Ok(record
            .filter(|r| digest(&r.salt, &credentials.password) == r.digest)
            .map(|r| r.user.clone()))
    }

    async fn select_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock();
        Ok(inner
            .by_name
            .get(username)
            .and_then(|id| inner.users.get(id))
            .map(|r| r.user.clone()))
    }

    async fn select_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        Ok(self.inner.lock().users.get(&id).map(|r| r.user.clone()))
    }

    async fn win(&self, id: UserId) -> Result<(), StoreError> {
        self.update(id, |user| {
            user.score += SCORE_STEP;
            user.total_count += 1;
            user.win_count += 1;
        })
    }

    async fn lose(&self, id: UserId) -> Result<(), StoreError> {
        self.update(id, |user| {
            user.score -= SCORE_STEP;
            user.total_count += 1;
        })
    }
}
