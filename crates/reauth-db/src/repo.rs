//! Repository traits
//!
//! Async interface over the session record store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::SessionRow;

/// Session repository trait
///
/// Every operation is a single unit of work: no partial writes are
/// observable by other callers.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session. Fails with `DuplicateIdentifier` if the id exists.
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow>;

    /// Find a session by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SessionRow>>;

    /// Which of the given ids are still stored, in one round-trip
    async fn existing_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>>;

    /// Delete a session. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    /// Number of stored sessions
    async fn count(&self) -> DbResult<i64>;
}

/// Create session input
#[derive(Clone)]
pub struct CreateSession {
    pub id: Uuid,
    pub mac_key: Vec<u8>,
    pub created_at: i64,
    pub valid_for_ms: i64,
}

impl std::fmt::Debug for CreateSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSession")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("valid_for_ms", &self.valid_for_ms)
            .finish_non_exhaustive()
    }
}

impl From<&reauth_types::SessionRecord> for CreateSession {
    fn from(record: &reauth_types::SessionRecord) -> Self {
        Self {
            id: record.id.0,
            mac_key: record.mac_key.clone(),
            created_at: record.created_at,
            valid_for_ms: record.valid_for_millis(),
        }
    }
}
