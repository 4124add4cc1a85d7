//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::middleware::SessionLocks;
use crate::services::media::MediaStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    media: MediaStorage,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let media = MediaStorage::new(config.media_root.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                media,
                session_locks: SessionLocks::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the uploaded media storage.
    #[must_use]
    pub fn media(&self) -> &MediaStorage {
        &self.inner.media
    }

    /// Get a reference to the per-session request locks.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }
}
