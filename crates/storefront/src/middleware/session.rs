//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. The session holds only
//! the shopper id; losing it on restart just starts a new cart. Pages that
//! only read never start a session, so the cookie appears once a shopper
//! first changes something.

use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::middleware::session_store::{MAX_SESSIONS, MokaSessionStore};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "matgar_session";

/// Create the session layer with a bounded in-memory store.
///
/// Sessions expire after the same idle time as shopper state.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaSessionStore> {
    let idle_seconds = i64::try_from(config.shopper_idle.as_secs()).unwrap_or(i64::MAX);
    let store = MokaSessionStore::new(MAX_SESSIONS, config.shopper_idle);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle_seconds),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
