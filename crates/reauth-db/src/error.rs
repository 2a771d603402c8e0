//! Database errors

use thiserror::Error;
use uuid::Uuid;

/// Result alias for store operations
pub type DbResult<T> = Result<T, DbError>;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A record with this identifier already exists
    #[error("duplicate session identifier: {0}")]
    DuplicateIdentifier(Uuid),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Row could not be converted into a domain record
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: &'static str },
}

impl DbError {
    /// Map an insert failure, recognising unique-key violations
    pub(crate) fn from_insert(id: Uuid, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::DuplicateIdentifier(id),
            _ => Self::Sqlx(err),
        }
    }
}
