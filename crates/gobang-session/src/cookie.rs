//! Extracting the session id from a `Cookie` header.

use gobang_protocol::SessionId;

/// The cookie name the login endpoint sets.
pub const SSID_COOKIE: &str = "SSID";

/// Finds `SSID=<number>` in a `Cookie` header value such as
/// `theme=dark; SSID=12`.
///
/// Returns `None` when there is no `SSID` entry or its value is not a
/// number.
pub fn ssid_from_cookie(header: &str) -> Option<SessionId> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SSID_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
        .map(SessionId)
}
