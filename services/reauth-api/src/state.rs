//! Application state

use std::sync::Arc;

use axum::extract::FromRef;
use reauth_core::{InternalSecret, SharedSessionService};
use reauth_db::DbPool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session authority behind its object-safe interface
    pub sessions: SharedSessionService,
    /// Secret that authorizes session creation
    pub internal_secret: InternalSecret,
    /// Database pool for readiness checks; absent when running on another store
    pub pool: Option<Arc<DbPool>>,
}

impl AppState {
    /// Create new application state
    pub fn new(sessions: SharedSessionService, internal_secret: InternalSecret) -> Self {
        Self {
            sessions,
            internal_secret,
            pool: None,
        }
    }

    /// Attach the pool checked by `/ready`
    #[must_use]
    pub fn with_pool(mut self, pool: DbPool) -> Self {
        self.pool = Some(Arc::new(pool));
        self
    }
}

impl FromRef<AppState> for InternalSecret {
    fn from_ref(state: &AppState) -> Self {
        state.internal_secret.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("has_pool", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}
