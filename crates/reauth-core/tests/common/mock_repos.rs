//! Mock repositories for testing

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reauth_db::{CreateSession, DbError, DbResult, SessionRepository, SessionRow};
use uuid::Uuid;

/// In-memory session repository for testing
#[derive(Default, Clone)]
pub struct MockSessionRepository {
    sessions: Arc<DashMap<Uuid, SessionRow>>,
    failing: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
    batch_reads: Arc<AtomicUsize>,
    read_delay_ms: Arc<AtomicU64>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down
    #[allow(dead_code)]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `find_by_id` calls served
    #[allow(dead_code)]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Hold every `find_by_id` result this long before returning it
    #[allow(dead_code)]
    pub fn set_read_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.read_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of `existing_ids` calls served
    #[allow(dead_code)]
    pub fn batch_reads(&self) -> usize {
        self.batch_reads.load(Ordering::SeqCst)
    }

    /// Remove a row without going through the authority
    #[allow(dead_code)]
    pub fn remove_directly(&self, id: Uuid) {
        self.sessions.remove(&id);
    }

    /// Insert a row directly
    #[allow(dead_code)]
    pub fn insert_row(&self, row: SessionRow) {
        self.sessions.insert(row.id, row);
    }

    /// Rewrite a stored row's creation time
    #[allow(dead_code)]
    pub fn set_created_at(&self, id: Uuid, created_at: i64) {
        if let Some(mut row) = self.sessions.get_mut(&id) {
            row.created_at = created_at;
        }
    }

    #[allow(dead_code)]
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
        match self.sessions.entry(session.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(DbError::DuplicateIdentifier(session.id))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(row.clone());
                Ok(row)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SessionRow>> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let row = self.sessions.get(&id).map(|r| r.value().clone());

        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(row)
    }

    async fn existing_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>> {
        self.check()?;
        self.batch_reads.fetch_add(1, Ordering::SeqCst);
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
