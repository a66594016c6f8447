//! Per-connection handler for the `/hall` and `/room` WebSocket endpoints.
//!
//! Each accepted connection gets its own task running this handler:
//!   1. Register an outbound queue for the connection and start its writer
//!   2. Resolve the `SSID` cookie to a session and refuse duplicate logins
//!   3. Enter presence, pin the session and send `hall_ready`/`room_ready`
//!   4. Loop: decode requests and dispatch them
//!   5. On close: leave presence, clean up, and let the session expire

use std::sync::Arc;

use gobang_presence::Scope;
use gobang_protocol::{Codec, GameRequest, GameResponse, HallRequest, OpType, UserId};
use gobang_room::Room;
use gobang_session::{Expiry, Session};
use gobang_store::UserStore;
use gobang_transport::{Connection, WebSocketConnection};

use crate::GobangError;
use crate::server::ServerState;

const REASON_DUPLICATE: &str = "duplicate login";
const REASON_NO_ROOM: &str = "no room found for user";
const REASON_MALFORMED: &str = "malformed request";
const REASON_UNKNOWN_OP: &str = "unknown request type";
const REASON_UID_MISMATCH: &str = "uid does not match the logged-in user";

/// The two WebSocket endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Hall,
    Room,
}

impl Endpoint {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/hall" => Some(Self::Hall),
            "/room" => Some(Self::Room),
            _ => None,
        }
    }

    fn scope(self) -> Scope {
        match self {
            Self::Hall => Scope::Hall,
            Self::Room => Scope::Room,
        }
    }

    fn ready_op(self) -> OpType {
        match self {
            Self::Hall => OpType::HallReady,
            Self::Room => OpType::RoomReady,
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S: UserStore>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S>>,
) -> Result<(), GobangError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, path = conn.path(), "handling new connection");

    let connections = Arc::clone(state.outbox.connections());
    let mut outbound = connections.register(conn_id);
    let writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(bytes) = outbound.recv().await {
                if let Err(error) = conn.send(&bytes).await {
                    tracing::debug!(%conn_id, %error, "send failed, writer stopping");
                    break;
                }
            }
        })
    };

    let result = match Endpoint::from_path(conn.path()) {
        Some(endpoint) => serve(&conn, &state, endpoint).await,
        None => {
            tracing::debug!(%conn_id, path = conn.path(), "unknown endpoint, closing");
            Ok(())
        }
    };

    // Dropping the sender lets the writer flush what is queued and exit.
    connections.unregister(conn_id);
    if let Err(error) = writer.await {
        tracing::warn!(%conn_id, %error, "writer task ended abnormally");
    }
    if let Err(error) = conn.close().await {
        tracing::debug!(%conn_id, %error, "close after disconnect");
    }
    result
}

/// Runs one endpoint: open, message loop, close.
async fn serve<S: UserStore>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    endpoint: Endpoint,
) -> Result<(), GobangError> {
    let Some(session) = authenticate(conn, state, endpoint) else {
        return Ok(());
    };
    let uid = session.user_id;

    // The room is looked up before entering presence; without one the
    // room endpoint has nothing to serve.
    let room = match endpoint {
        Endpoint::Hall => None,
        Endpoint::Room => match state.rooms.get_by_user_id(uid) {
            Some(room) => Some(room),
            None => {
                tracing::debug!(%uid, "room connection without a room");
                reply(state, conn, GameResponse::failure(OpType::RoomReady.as_str(), REASON_NO_ROOM));
                return Ok(());
            }
        },
    };

    let scope = endpoint.scope();
    state.outbox.presence().enter(scope, uid, conn.id());
    state.sessions.set_expiry(session.ssid, Expiry::Forever);

    let ready = GameResponse::success(endpoint.ready_op().as_str()).with_uid(uid);
    let ready = match &room {
        Some(room) => ready.with_room(room.room_id(), room.white(), room.black()),
        None => ready,
    };
    reply(state, conn, ready);
    tracing::info!(%uid, %scope, conn_id = %conn.id(), "user connected");

    let result = message_loop(conn, state, uid, room.as_deref()).await;

    state.outbox.presence().exit(scope, uid);
    match endpoint {
        Endpoint::Hall => {
            if let Err(error) = state.matchmaker.remove(uid).await {
                tracing::warn!(%uid, %error, "failed to leave match queue");
            }
        }
        Endpoint::Room => state.rooms.remove_user(uid).await,
    }
    state.sessions.set_default_expiry(session.ssid);
    tracing::info!(%uid, %scope, "user disconnected");
    result
}

/// Resolves the connection's cookie to a session and rejects users who
/// are already connected anywhere. Failures are answered with a
/// `*_ready` reply carrying `result: false`.
fn authenticate<S: UserStore>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    endpoint: Endpoint,
) -> Option<Session> {
    let optype = endpoint.ready_op().as_str();
    let session = match state.sessions.session_from_cookie(conn.cookie()) {
        Ok(session) => session,
        Err(error) => {
            tracing::debug!(conn_id = %conn.id(), %error, "connection without a session");
            reply(state, conn, GameResponse::failure(optype, error.to_string()));
            return None;
        }
    };

    let presence = state.outbox.presence();
    let uid = session.user_id;
    if presence.is_present(Scope::Hall, uid) || presence.is_present(Scope::Room, uid) {
        tracing::info!(%uid, conn_id = %conn.id(), "duplicate login refused");
        reply(state, conn, GameResponse::failure(optype, REASON_DUPLICATE));
        return None;
    }
    Some(session)
}

async fn message_loop<S: UserStore>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    uid: UserId,
    room: Option<&Room<S>>,
) -> Result<(), GobangError> {
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%uid, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%uid, error = %e, "recv error");
                return Err(e.into());
            }
        };

        match room {
            None => handle_hall_message(conn, state, uid, &data).await,
            Some(room) => handle_room_message(conn, state, uid, room, &data).await,
        }
    }
}

async fn handle_hall_message<S: UserStore>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    uid: UserId,
    data: &[u8],
) {
    let req: HallRequest = match state.codec.decode(data) {
        Ok(req) => req,
        Err(error) => {
            tracing::debug!(%uid, %error, "undecodable hall message");
            reply(state, conn, GameResponse::failure(OpType::Unknown.as_str(), REASON_MALFORMED));
            return;
        }
    };

    let outcome = match req.op() {
        OpType::MatchStart => state.matchmaker.add(uid).await.map(|_| ()),
        OpType::MatchStop => state.matchmaker.remove(uid).await.map(|_| ()),
        _ => {
            reply(state, conn, GameResponse::failure(req.optype, REASON_UNKNOWN_OP));
            return;
        }
    };
    let resp = match outcome {
        Ok(()) => GameResponse::success(req.optype),
        Err(error) => GameResponse::failure(req.optype, error.to_string()),
    };
    reply(state, conn, resp);
}

async fn handle_room_message<S: UserStore>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    uid: UserId,
    room: &Room<S>,
    data: &[u8],
) {
    let req: GameRequest = match state.codec.decode(data) {
        Ok(req) => req,
        Err(error) => {
            tracing::debug!(%uid, %error, "undecodable room message");
            reply(state, conn, GameResponse::failure(OpType::Unknown.as_str(), REASON_MALFORMED));
            return;
        }
    };

    // Only the sender hears about a forged uid.
    if req.uid != uid {
        tracing::debug!(%uid, claimed = %req.uid, "uid mismatch");
        reply(state, conn, GameResponse::echo(&req).with_reason(REASON_UID_MISMATCH));
        return;
    }

    // The room broadcasts the outcome to both players itself.
    let resp = room.handle_request(&req).await;
    tracing::debug!(%uid, room_id = %room.room_id(), optype = %resp.optype, result = resp.result, "request handled");
}

/// Queues `resp` for this connection only.
fn reply<S: UserStore>(state: &ServerState<S>, conn: &WebSocketConnection, resp: GameResponse) {
    if let Err(error) = state.outbox.send_to(conn.id(), &resp) {
        tracing::debug!(conn_id = %conn.id(), %error, "reply dropped");
    }
}
