//! The HTTP listener: account routes plus static files.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use gobang_store::UserStore;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::accounts::{self, ApiReply};
use crate::server::ServerState;

/// `/reg`, `/login` and `/info`, with every other path served from
/// `web_root` (404 when the file does not exist).
pub(crate) fn router<S: UserStore>(state: Arc<ServerState<S>>, web_root: &Path) -> Router {
    Router::new()
        .route("/reg", post(register::<S>))
        .route("/login", post(login::<S>))
        .route("/info", get(info::<S>))
        .fallback_service(ServeDir::new(web_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn register<S: UserStore>(State(state): State<Arc<ServerState<S>>>, body: Bytes) -> ApiReply {
    accounts::register(state.store.as_ref(), &body).await
}

async fn login<S: UserStore>(State(state): State<Arc<ServerState<S>>>, body: Bytes) -> ApiReply {
    accounts::login(state.store.as_ref(), &state.sessions, &body).await
}

async fn info<S: UserStore>(State(state): State<Arc<ServerState<S>>>, headers: HeaderMap) -> ApiReply {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    accounts::info(state.store.as_ref(), &state.sessions, cookie).await
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.body)).into_response();
        if let Some(cookie) = self.set_cookie {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
                Err(error) => tracing::warn!(%error, "unusable Set-Cookie value dropped"),
            }
        }
        response
    }
}
