//! A single game between two players.
//!
//! Board, status and player count live behind one lock. Decisions are
//! made under that lock; score updates and broadcasts run after it is
//! released, so a slow store or a dead connection never stalls the
//! room for the other player.

use std::sync::Arc;

use gobang_presence::{Outbox, Scope};
use gobang_protocol::{GameRequest, GameResponse, OpType, RoomId, UserId};
use gobang_store::UserStore;
use parking_lot::Mutex;

use crate::{Board, RoomConfig, RoomStatus, Stone};

const REASON_ROOM_MISMATCH: &str = "room id mismatch";
const REASON_UNKNOWN_OP: &str = "unknown request type";
const REASON_GAME_OVER: &str = "game is over";
const REASON_OUT_OF_RANGE: &str = "position out of range";
const REASON_NOT_A_PLAYER: &str = "not a player in this room";
const REASON_OCCUPIED: &str = "position occupied";
const REASON_FIVE: &str = "five in a row";
const REASON_OFFLINE: &str = "opponent offline";
const REASON_DISCONNECTED: &str = "opponent disconnected";
const REASON_BANNED: &str = "message contains banned content";

#[derive(Debug)]
struct GameState {
    status: RoomStatus,
    board: Board,
    player_count: usize,
}

/// The result of a finished game, charged to the store after unlock.
#[derive(Debug, Clone, Copy)]
struct Settlement {
    winner: UserId,
    loser: UserId,
}

/// One game room. White and black never change after creation.
pub struct Room<S: UserStore> {
    room_id: RoomId,
    white: UserId,
    black: UserId,
    state: Mutex<GameState>,
    store: Arc<S>,
    outbox: Outbox,
    config: Arc<RoomConfig>,
}

impl<S: UserStore> Room<S> {
    pub(crate) fn new(
        room_id: RoomId,
        white: UserId,
        black: UserId,
        store: Arc<S>,
        outbox: Outbox,
        config: Arc<RoomConfig>,
    ) -> Self {
        Self {
            room_id,
            white,
            black,
            state: Mutex::new(GameState {
                status: RoomStatus::Active,
                board: Board::new(),
                player_count: 2,
            }),
            store,
            outbox,
            config,
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn white(&self) -> UserId {
        self.white
    }

    pub fn black(&self) -> UserId {
        self.black
    }

    pub fn status(&self) -> RoomStatus {
        self.state.lock().status
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().player_count
    }

    /// A copy of the current board.
    pub fn board(&self) -> Board {
        self.state.lock().board.clone()
    }

    pub fn is_player(&self, uid: UserId) -> bool {
        uid == self.white || uid == self.black
    }

    /// The other seat, for a user who is white or black.
    fn opponent_of(&self, uid: UserId) -> UserId {
        if uid == self.white { self.black } else { self.white }
    }

    // -- Requests ---------------------------------------------------------

    /// Applies a move or chat line, broadcasts the outcome to both players
    /// and returns it.
    pub async fn handle_request(&self, req: &GameRequest) -> GameResponse {
        if req.room_id != self.room_id {
            tracing::debug!(room_id = %self.room_id, requested = %req.room_id, "room id mismatch");
            let resp = GameResponse::echo(req).with_reason(REASON_ROOM_MISMATCH);
            self.broadcast(&resp);
            return resp;
        }

        let (resp, settlement) = match req.op() {
            OpType::PutChess => self.handle_chess(req),
            OpType::Chat => (self.handle_chat(req), None),
            _ => (GameResponse::echo(req).with_reason(REASON_UNKNOWN_OP), None),
        };

        if let Some(settlement) = settlement {
            self.settle(settlement).await;
        }
        self.broadcast(&resp);
        resp
    }

    fn handle_chess(&self, req: &GameRequest) -> (GameResponse, Option<Settlement>) {
        let resp = GameResponse::echo(req);

        // Presence is read before taking the room lock.
        let white_online = self.outbox.presence().is_present(Scope::Room, self.white);
        let black_online = self.outbox.presence().is_present(Scope::Room, self.black);

        let mut state = self.state.lock();
        if state.status.is_over() {
            return (resp.with_reason(REASON_GAME_OVER), None);
        }

        let offline_loser = match (white_online, black_online) {
            (false, _) => Some(self.white),
            (true, false) => Some(self.black),
            (true, true) => None,
        };
        if let Some(loser) = offline_loser {
            let winner = self.opponent_of(loser);
            state.status = RoomStatus::Over;
            tracing::info!(room_id = %self.room_id, %winner, %loser, "game over: opponent offline");
            let resp = resp
                .with_result(true)
                .with_reason(REASON_OFFLINE)
                .with_winner(Some(winner));
            return (resp, Some(Settlement { winner, loser }));
        }

        let Some((row, col)) = req.row.zip(req.col).and_then(|(r, c)| Board::position(r, c))
        else {
            return (resp.with_reason(REASON_OUT_OF_RANGE), None);
        };
        if !self.is_player(req.uid) {
            return (resp.with_reason(REASON_NOT_A_PLAYER), None);
        }
        if !state.board.is_empty_at(row, col) {
            return (resp.with_reason(REASON_OCCUPIED), None);
        }

        let stone = if req.uid == self.white { Stone::White } else { Stone::Black };
        state.board.place(row, col, stone);
        tracing::debug!(room_id = %self.room_id, uid = %req.uid, row, col, ?stone, "stone placed");

        if !state.board.check_win(row, col, stone) {
            return (resp.with_result(true), None);
        }

        let winner = req.uid;
        let loser = self.opponent_of(winner);
        state.status = RoomStatus::Over;
        tracing::info!(room_id = %self.room_id, %winner, %loser, "game over: five in a row");
        let resp = resp
            .with_result(true)
            .with_reason(REASON_FIVE)
            .with_winner(Some(winner));
        (resp, Some(Settlement { winner, loser }))
    }

    fn handle_chat(&self, req: &GameRequest) -> GameResponse {
        let resp = GameResponse::echo(req);
        let message = req.message.as_deref().unwrap_or_default();
        if self.config.is_banned(message) {
            tracing::debug!(room_id = %self.room_id, uid = %req.uid, "chat rejected");
            let mut resp = resp.with_reason(REASON_BANNED);
            // The rejection still goes to both players; the text must not.
            resp.message = None;
            return resp;
        }
        resp.with_result(true)
    }

    // -- Exit -------------------------------------------------------------

    /// Handles a player leaving. While the game is active this is a
    /// forfeit: the other player wins and both are told. Returns how many
    /// players remain.
    pub async fn handle_exit(&self, uid: UserId) -> usize {
        let (settlement, remaining) = {
            let mut state = self.state.lock();
            let settlement = if state.status.is_over() {
                None
            } else {
                state.status = RoomStatus::Over;
                Some(Settlement {
                    winner: self.opponent_of(uid),
                    loser: uid,
                })
            };
            state.player_count = state.player_count.saturating_sub(1);
            (settlement, state.player_count)
        };
        tracing::info!(room_id = %self.room_id, %uid, remaining, "player left room");

        if let Some(settlement) = settlement {
            tracing::info!(
                room_id = %self.room_id,
                winner = %settlement.winner,
                loser = %settlement.loser,
                "game over: forfeit"
            );
            self.settle(settlement).await;

            let mut resp = GameResponse::success(OpType::PutChess.as_str())
                .with_uid(uid)
                .with_reason(REASON_DISCONNECTED)
                .with_winner(Some(settlement.winner));
            resp.room_id = Some(self.room_id);
            resp.row = Some(-1);
            resp.col = Some(-1);
            self.broadcast(&resp);
        }
        remaining
    }

    // -- Helpers ----------------------------------------------------------

    async fn settle(&self, settlement: Settlement) {
        if let Err(error) = self.store.win(settlement.winner).await {
            tracing::warn!(room_id = %self.room_id, uid = %settlement.winner, %error, "failed to record win");
        }
        if let Err(error) = self.store.lose(settlement.loser).await {
            tracing::warn!(room_id = %self.room_id, uid = %settlement.loser, %error, "failed to record loss");
        }
    }

    /// Sends `resp` to white and black. A missing connection is logged
    /// and does not stop the other send.
    fn broadcast(&self, resp: &GameResponse) {
        for uid in [self.white, self.black] {
            if let Err(error) = self.outbox.send(Scope::Room, uid, resp) {
                tracing::warn!(room_id = %self.room_id, %uid, %error, "broadcast failed");
            }
        }
    }
}

impl<S: UserStore> std::fmt::Debug for Room<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("room_id", &self.room_id)
            .field("white", &self.white)
            .field("black", &self.black)
            .finish_non_exhaustive()
    }
}
