//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions, and serializes
//! the requests of each session so cart updates never overwrite each other.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ps_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// How long an idle per-session lock is kept. Must exceed the longest
/// request, since an entry is only touched when a request acquires it.
const LOCK_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (for the cookie's `Secure` flag)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The `tower_sessions.session` table is created by migration
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Per-session async locks, keyed by session cookie value.
///
/// Entries expire only by idleness. There is no size bound, because evicting
/// a lock that is still held would let a second request of the same session
/// take a fresh one.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder().time_to_idle(LOCK_IDLE_TIMEOUT).build(),
        }
    }

    /// Wait for exclusive use of a session.
    pub async fn acquire(&self, session_key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with_by_ref(session_key, async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the requests of one session one at a time.
///
/// Must be layered outside the session layer: the lock is taken before the
/// session record is loaded and released after it has been saved. Requests
/// without a session cookie have no stored session to race on.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let _guard = match session_cookie(request.headers()) {
        Some(key) => Some(state.session_locks().acquire(&key).await),
        None => None,
    };

    next.run(request).await
}

/// Value of the session cookie, if the request carries one.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.to_string())
}
