//! Common test utilities for reauth-api integration tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use dashmap::DashMap;
use reauth_api::{build_router, AppState};
use reauth_core::{InternalSecret, SessionAuthority, SessionConfig, SharedSessionService};
use reauth_db::{CreateSession, DbError, DbResult, SessionRepository, SessionRow};
use reauth_extension::ExtensionHost;
use uuid::Uuid;

pub const SECRET: &str = "test-internal-secret";

/// In-memory session repository for testing
#[derive(Default, Clone)]
pub struct MockSessionRepository {
    sessions: Arc<DashMap<Uuid, SessionRow>>,
    failing: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockSessionRepository {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_created_at(&self, id: Uuid, created_at: i64) {
        if let Some(mut row) = self.sessions.get_mut(&id) {
            row.created_at = created_at;
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    fn check(&self) -> DbResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        self.check()?;
        let row = SessionRow {
            id: session.id,
            mac_key: session.mac_key,
            created_at: session.created_at,
            valid_for_ms: session.valid_for_ms,
        };
        if self.sessions.contains_key(&row.id) {
            return Err(DbError::DuplicateIdentifier(row.id));
        }
        self.sessions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SessionRow>> {
        self.check()?;
        Ok(self.sessions.get(&id).map(|r| r.value().clone()))
    }

    async fn existing_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>> {
        self.check()?;
        Ok(ids
            .iter()
            .filter(|id| self.sessions.contains_key(*id))
            .copied()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        self.check()?;
        Ok(self.sessions.remove(&id).is_some())
    }

    async fn count(&self) -> DbResult<i64> {
        self.check()?;
        Ok(self.sessions.len() as i64)
    }
}

/// Router over an in-memory store, with whatever the host collected
pub fn app_with_host(host: &ExtensionHost) -> (Router, MockSessionRepository) {
    let repo = MockSessionRepository::default();
    let authority = SessionAuthority::new(Arc::new(repo.clone()), SessionConfig::default());
    let sessions: SharedSessionService = Arc::new(authority);
    let state = AppState::new(sessions, InternalSecret::new(SECRET));
    (build_router(state, host.seal()), repo)
}

#[allow(dead_code)]
pub fn app() -> (Router, MockSessionRepository) {
    app_with_host(&ExtensionHost::new())
}

pub fn request(method: Method, path: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
