//! Room manager: allocates rooms and tracks which user is in which room.

use std::collections::HashMap;
use std::sync::Arc;

use gobang_presence::Outbox;
use gobang_protocol::{RoomId, UserId};
use gobang_store::UserStore;
use parking_lot::Mutex;

use crate::{Room, RoomConfig, RoomError};

/// Both indices live under one lock so they can never disagree.
struct Indices<S: UserStore> {
    /// Next id to hand out. Only advanced once a room is really created.
    next_id: u64,
    rooms: HashMap<RoomId, Arc<Room<S>>>,
    users: HashMap<UserId, RoomId>,
}

/// Creates rooms for matched pairs and finds them again by room or user.
///
/// A user is indexed in at most one room at a time.
pub struct RoomManager<S: UserStore> {
    indices: Mutex<Indices<S>>,
    store: Arc<S>,
    outbox: Outbox,
    config: Arc<RoomConfig>,
}

impl<S: UserStore> RoomManager<S> {
    pub fn new(store: Arc<S>, outbox: Outbox, config: RoomConfig) -> Self {
        Self {
            indices: Mutex::new(Indices {
                next_id: 1,
                rooms: HashMap::new(),
                users: HashMap::new(),
            }),
            store,
            outbox,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room with `white` and `black` seated.
    ///
    /// # Errors
    /// - [`RoomError::NotPresent`] — a player is not connected in the
    ///   configured eligibility scope
    /// - [`RoomError::SamePlayer`] — `white == black`
    /// - [`RoomError::AlreadyInRoom`] — a player already has a room
    pub fn create_room(&self, white: UserId, black: UserId) -> Result<Arc<Room<S>>, RoomError> {
        let scope = self.config.eligibility_scope;
        for uid in [white, black] {
            if !self.outbox.presence().is_present(scope, uid) {
                return Err(RoomError::NotPresent { uid, scope });
            }
        }
        if white == black {
            return Err(RoomError::SamePlayer(white));
        }

        let mut indices = self.indices.lock();
        for uid in [white, black] {
            if let Some(&room_id) = indices.users.get(&uid) {
                return Err(RoomError::AlreadyInRoom(uid, room_id));
            }
        }

        let room_id = RoomId(indices.next_id);
        indices.next_id += 1;
        let room = Arc::new(Room::new(
            room_id,
            white,
            black,
            Arc::clone(&self.store),
            self.outbox.clone(),
            Arc::clone(&self.config),
        ));
        indices.rooms.insert(room_id, Arc::clone(&room));
        indices.users.insert(white, room_id);
        indices.users.insert(black, room_id);
        drop(indices);

        tracing::info!(%room_id, %white, %black, "room created");
        Ok(room)
    }

    pub fn get_by_room_id(&self, room_id: RoomId) -> Option<Arc<Room<S>>> {
        self.indices.lock().rooms.get(&room_id).cloned()
    }

    pub fn get_by_user_id(&self, uid: UserId) -> Option<Arc<Room<S>>> {
        let indices = self.indices.lock();
        let room_id = indices.users.get(&uid)?;
        indices.rooms.get(room_id).cloned()
    }

    /// Drops a room and both of its players from the indices. Absent ids
    /// are ignored. Handlers still holding the `Arc` keep the room alive
    /// until they let go.
    pub fn remove_room(&self, room_id: RoomId) {
        let mut indices = self.indices.lock();
        let Some(room) = indices.rooms.remove(&room_id) else {
            return;
        };
        for uid in [room.white(), room.black()] {
            // The seat may already point at a newer room.
            if indices.users.get(&uid) == Some(&room_id) {
                indices.users.remove(&uid);
            }
        }
        drop(indices);
        tracing::info!(%room_id, "room destroyed");
    }

    /// Runs exit handling for `uid`'s room and removes the room once
    /// nobody is left in it. Users without a room are ignored.
    ///
    /// The leaving user is unindexed straight away, so they can be matched
    /// again while the opponent is still looking at the final board.
    pub async fn remove_user(&self, uid: UserId) {
        let Some(room) = self.get_by_user_id(uid) else {
            return;
        };
        let remaining = room.handle_exit(uid).await;

        let room_id = room.room_id();
        {
            let mut indices = self.indices.lock();
            if indices.users.get(&uid) == Some(&room_id) {
                indices.users.remove(&uid);
            }
        }
        if remaining == 0 {
            self.remove_room(room_id);
        }
    }

    pub fn room_count(&self) -> usize {
        self.indices.lock().rooms.len()
    }
}
