//! Account endpoints: registration, login and the user-info lookup.
//!
//! Kept free of any HTTP framework. Each call returns an [`ApiReply`]
//! that [`crate::http`] turns into a response, so the logic is tested
//! without a listener.

use gobang_session::{SSID_COOKIE, SessionManager, SessionStatus};
use gobang_store::{Credentials, StoreError, UserStore};
use serde::Deserialize;
use serde_json::{Value, json};

const REASON_MALFORMED: &str = "malformed request body";
const REASON_INCOMPLETE: &str = "please enter username and password";
const REASON_TAKEN: &str = "username already taken";
const REASON_REGISTERED: &str = "registration succeeded";
const REASON_BAD_CREDENTIALS: &str = "wrong username or password";
const REASON_LOGGED_IN: &str = "login succeeded";
const REASON_NO_USER: &str = "user not found, please log in again";
const REASON_STORE: &str = "user store unavailable";

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL: u16 = 500;

/// A framework-neutral reply: status code, JSON body and an optional
/// `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
    pub set_cookie: Option<String>,
}

impl ApiReply {
    fn outcome(status: u16, result: bool, reason: &str) -> Self {
        Self {
            status,
            body: json!({ "result": result, "reason": reason }),
            set_cookie: None,
        }
    }

    fn bad_request(reason: &str) -> Self {
        Self::outcome(STATUS_BAD_REQUEST, false, reason)
    }

    fn store_failure(error: &StoreError) -> Self {
        tracing::warn!(%error, "user store call failed");
        Self::outcome(STATUS_INTERNAL, false, REASON_STORE)
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// The `reason` field of the body, if any.
    pub fn reason(&self) -> Option<&str> {
        self.body.get("reason").and_then(Value::as_str)
    }
}

/// Body of `/reg` and `/login`. Both fields are optional here so a
/// missing one is reported as incomplete rather than malformed.
#[derive(Debug, Deserialize)]
struct AccountForm {
    username: Option<String>,
    password: Option<String>,
}

fn parse_credentials(body: &[u8]) -> Result<Credentials, ApiReply> {
    let form: AccountForm = serde_json::from_slice(body).map_err(|error| {
        tracing::debug!(%error, "malformed account body");
        ApiReply::bad_request(REASON_MALFORMED)
    })?;
    match (form.username, form.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Ok(Credentials { username, password })
        }
        _ => Err(ApiReply::bad_request(REASON_INCOMPLETE)),
    }
}

/// `POST /reg`: creates an account.
pub async fn register<S: UserStore>(store: &S, body: &[u8]) -> ApiReply {
    let credentials = match parse_credentials(body) {
        Ok(credentials) => credentials,
        Err(reply) => return reply,
    };
    match store.insert(&credentials).await {
        Ok(_) => ApiReply::outcome(STATUS_OK, true, REASON_REGISTERED),
        Err(StoreError::DuplicateUsername(username)) => {
            tracing::debug!(%username, "registration refused: name taken");
            ApiReply::bad_request(REASON_TAKEN)
        }
        Err(error) => ApiReply::store_failure(&error),
    }
}

/// `POST /login`: checks credentials and opens a session that expires
/// after the configured timeout unless a connection claims it.
pub async fn login<S: UserStore>(store: &S, sessions: &SessionManager, body: &[u8]) -> ApiReply {
    let credentials = match parse_credentials(body) {
        Ok(credentials) => credentials,
        Err(reply) => return reply,
    };
    let user = match store.login(&credentials).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(username = %credentials.username, "login refused");
            return ApiReply::bad_request(REASON_BAD_CREDENTIALS);
        }
        Err(error) => return ApiReply::store_failure(&error),
    };

    let session = sessions.create_session(user.id, SessionStatus::Login);
    sessions.set_default_expiry(session.ssid);
    tracing::info!(uid = %user.id, ssid = %session.ssid, "user logged in");

    ApiReply {
        set_cookie: Some(format!("{SSID_COOKIE}={}", session.ssid.0)),
        ..ApiReply::outcome(STATUS_OK, true, REASON_LOGGED_IN)
    }
}

/// `GET /info`: the logged-in user's record. Refreshes the session's
/// expiry on success.
pub async fn info<S: UserStore>(
    store: &S,
    sessions: &SessionManager,
    cookie: Option<&str>,
) -> ApiReply {
    let session = match sessions.session_from_cookie(cookie) {
        Ok(session) => session,
        Err(error) => return ApiReply::bad_request(&error.to_string()),
    };
    let user = match store.select_by_id(session.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return ApiReply::bad_request(REASON_NO_USER),
        Err(error) => return ApiReply::store_failure(&error),
    };

    let body = match serde_json::to_value(&user) {
        Ok(body) => body,
        Err(error) => {
            tracing::warn!(%error, "failed to serialize user");
            return ApiReply::outcome(STATUS_INTERNAL, false, REASON_STORE);
        }
    };
    sessions.set_default_expiry(session.ssid);
    ApiReply {
        status: STATUS_OK,
        body,
        set_cookie: None,
    }
}
