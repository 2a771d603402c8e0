//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use std::time::Duration;

use reauth_types::{SessionId, SessionRecord};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::DbError;

/// Session row from the database
#[derive(Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub mac_key: Vec<u8>,
    pub created_at: i64,
    pub valid_for_ms: i64,
}

impl std::fmt::Debug for SessionRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRow")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("valid_for_ms", &self.valid_for_ms)
            .finish_non_exhaustive()
    }
}

impl SessionRow {
    /// Convert to domain SessionId
    pub fn session_id(&self) -> SessionId {
        SessionId(self.id)
    }
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = DbError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let valid_for_ms = u64::try_from(row.valid_for_ms).map_err(|_| DbError::Corrupt {
            id: row.id,
            reason: "negative validity",
        })?;
        if row.mac_key.is_empty() {
            return Err(DbError::Corrupt {
                id: row.id,
                reason: "empty mac key",
            });
        }

        Ok(SessionRecord {
            id: SessionId(row.id),
            mac_key: row.mac_key,
            created_at: row.created_at,
            valid_for: Duration::from_millis(valid_for_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(valid_for_ms: i64, mac_key: Vec<u8>) -> SessionRow {
        SessionRow {
            id: Uuid::new_v4(),
            mac_key,
            created_at: 1_700_000_000_000,
            valid_for_ms,
        }
    }

    #[test]
    fn test_row_to_record() {
        let r = row(1_800_000, vec![9; 32]);
        let id = r.id;
        let record = SessionRecord::try_from(r).unwrap();
        assert_eq!(record.id, SessionId(id));
        assert_eq!(record.valid_for, Duration::from_secs(1800));
        assert_eq!(record.expires_at_millis(), 1_700_001_800_000);
    }

    #[test]
    fn test_negative_validity_is_corrupt() {
        let err = SessionRecord::try_from(row(-1, vec![9; 32])).unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
    }

    #[test]
    fn test_empty_key_is_corrupt() {
        let err = SessionRecord::try_from(row(1, Vec::new())).unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
    }

    #[test]
    fn test_create_input_from_record() {
        let record = SessionRecord::new(SessionId::new(), vec![1; 32], Duration::from_secs(60));
        let input = crate::CreateSession::from(&record);
        assert_eq!(input.id, record.id.0);
        assert_eq!(input.valid_for_ms, 60_000);
        assert!(!format!("{input:?}").contains("mac_key"));
    }
}
