//! The matchmaker: tiered queues plus one worker task per tier.

use std::sync::Arc;

use gobang_presence::{Outbox, Scope};
use gobang_protocol::{GameResponse, OpType, UserId};
use gobang_room::RoomManager;
use gobang_store::UserStore;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{MatchConfig, MatchError, MatchQueue, Tier};

struct Shared<S: UserStore> {
    queues: [MatchQueue; 3],
    store: Arc<S>,
    rooms: Arc<RoomManager<S>>,
    outbox: Outbox,
    config: MatchConfig,
}

impl<S: UserStore> Shared<S> {
    fn queue(&self, tier: Tier) -> &MatchQueue {
        &self.queues[tier.index()]
    }

    async fn tier_of(&self, uid: UserId) -> Result<Tier, MatchError> {
        let user = self
            .store
            .select_by_id(uid)
            .await?
            .ok_or(MatchError::UnknownUser(uid))?;
        Ok(Tier::for_score(user.score))
    }
}

/// Pairs waiting users of similar score and starts their game.
///
/// Workers are spawned by [`start`](Self::start) and run until
/// [`shutdown`](Self::shutdown) (or until the matchmaker is dropped).
pub struct Matchmaker<S: UserStore> {
    shared: Arc<Shared<S>>,
    shutdown_tx: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: UserStore> Matchmaker<S> {
    /// Builds the queues and spawns one worker per tier. Must be called
    /// from within a tokio runtime.
    pub fn start(
        store: Arc<S>,
        rooms: Arc<RoomManager<S>>,
        outbox: Outbox,
        config: MatchConfig,
    ) -> Self {
        let shared = Arc::new(Shared {
            queues: Default::default(),
            store,
            rooms,
            outbox,
            config,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let workers = Tier::ALL
            .into_iter()
            .map(|tier| {
                tokio::spawn(run_worker(
                    Arc::clone(&shared),
                    tier,
                    shutdown_rx.clone(),
                ))
            })
            .collect();
        tracing::info!("matchmaker started");

        Self {
            shared,
            shutdown_tx,
            workers: Mutex::new(workers),
        }
    }

    /// Queues `uid` in the tier matching its current score. Queuing a user
    /// who is already waiting in that tier changes nothing.
    ///
    /// # Errors
    /// [`MatchError::Store`] if the score lookup fails,
    /// [`MatchError::UnknownUser`] if there is no such user.
    pub async fn add(&self, uid: UserId) -> Result<Tier, MatchError> {
        let tier = self.shared.tier_of(uid).await?;
        if self.shared.queue(tier).push(uid) {
            tracing::info!(%uid, %tier, "user queued for match");
        } else {
            tracing::debug!(%uid, %tier, "user already queued");
        }
        Ok(tier)
    }

    /// Takes `uid` out of the tier matching its current score. Returns
    /// whether it was queued there.
    ///
    /// # Errors
    /// Same as [`add`](Self::add).
    pub async fn remove(&self, uid: UserId) -> Result<bool, MatchError> {
        let tier = self.shared.tier_of(uid).await?;
        let removed = self.shared.queue(tier).remove(uid);
        if removed {
            tracing::info!(%uid, %tier, "user left match queue");
        }
        Ok(removed)
    }

    pub fn queue_len(&self, tier: Tier) -> usize {
        self.shared.queue(tier).len()
    }

    pub fn is_queued(&self, tier: Tier, uid: UserId) -> bool {
        self.shared.queue(tier).contains(uid)
    }

    /// Stops all workers and waits for them to exit. Queued users stay
    /// queued but are no longer paired.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(error) = worker.await {
                tracing::warn!(%error, "match worker ended abnormally");
            }
        }
        tracing::info!("matchmaker stopped");
    }
}

impl<S: UserStore> Drop for Matchmaker<S> {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// What a worker does after one pairing attempt.
enum Attempt {
    Done,
    Backoff,
}

async fn run_worker<S: UserStore>(
    shared: Arc<Shared<S>>,
    tier: Tier,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::debug!(%tier, "match worker started");
    let queue = shared.queue(tier);
    loop {
        if *shutdown.borrow() {
            break;
        }
        let (a, b) = tokio::select! {
            _ = shutdown.changed() => break,
            pair = queue.next_pair() => pair,
        };

        if let Attempt::Backoff = try_match(&shared, queue, tier, a, b) {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(shared.config.retry_delay) => {}
            }
        }
    }
    tracing::debug!(%tier, "match worker stopped");
}

/// One pairing attempt for `a` and `b`, already popped from `queue`.
fn try_match<S: UserStore>(
    shared: &Shared<S>,
    queue: &MatchQueue,
    tier: Tier,
    a: UserId,
    b: UserId,
) -> Attempt {
    if a == b {
        queue.push(a);
        return Attempt::Done;
    }

    let presence = shared.outbox.presence();
    if !presence.is_present(Scope::Hall, a) {
        tracing::debug!(%tier, uid = %a, "queued user left the hall, dropping");
        queue.push(b);
        return Attempt::Done;
    }
    if !presence.is_present(Scope::Hall, b) {
        tracing::debug!(%tier, uid = %b, "queued user left the hall, dropping");
        queue.push(a);
        return Attempt::Done;
    }

    let room = match shared.rooms.create_room(a, b) {
        Ok(room) => room,
        Err(error) => {
            tracing::warn!(%tier, %a, %b, %error, "room creation failed, requeueing");
            queue.push(a);
            queue.push(b);
            return Attempt::Backoff;
        }
    };
    tracing::info!(%tier, room_id = %room.room_id(), %a, %b, "match made");

    let notice = GameResponse::success(OpType::MatchSuccess.as_str());
    for uid in [a, b] {
        if let Err(error) = shared.outbox.send(Scope::Hall, uid, &notice) {
            tracing::warn!(%uid, %error, "failed to send match_success");
        }
    }
    Attempt::Done
}
