//! Process configuration loaded from a JSON file at startup.

use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf, time::Duration};

use gobang_match::MatchConfig;
use gobang_presence::Scope;
use gobang_room::RoomConfig;
use gobang_session::SessionConfig;
use serde::Deserialize;
use tracing::{info, warn};

/// Where the server looks for its configuration when no override is set.
const DEFAULT_CONFIG_PATH: &str = "config/gobang.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GOBANG_CONFIG_PATH";

/// Runtime configuration for the server binary.
///
/// Every field is optional in the file; missing ones take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener for `/reg`, `/login`, `/info` and static files.
    pub http_addr: String,
    /// Listener for the `/hall` and `/room` WebSocket endpoints.
    pub ws_addr: String,
    /// Directory static files are served from.
    pub web_root: PathBuf,
    pub session_timeout_ms: u64,
    pub banned_words: Vec<String>,
    /// Where both players must be present when the matchmaker opens a room.
    pub room_eligibility_scope: Scope,
    pub match_retry_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let room = RoomConfig::default();
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            ws_addr: "0.0.0.0:8081".to_string(),
            web_root: PathBuf::from("./wwwroot"),
            session_timeout_ms: 30_000,
            banned_words: room.banned_words,
            // Matched players are still on their hall connection when the
            // room is created.
            room_eligibility_scope: Scope::Hall,
            match_retry_delay_ms: 100,
        }
    }
}

impl AppConfig {
    /// Loads the file named by `GOBANG_CONFIG_PATH`, or the default path.
    ///
    /// Never fails: a missing file means defaults, and an unreadable or
    /// malformed one is logged and replaced by defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found; using built-in defaults");
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: Duration::from_millis(self.session_timeout_ms),
        }
    }

    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            banned_words: self.banned_words.clone(),
            eligibility_scope: self.room_eligibility_scope,
        }
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            retry_delay: Duration::from_millis(self.match_retry_delay_ms),
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
