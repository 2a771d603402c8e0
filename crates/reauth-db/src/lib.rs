//! ReAuth DB - Session record store
//!
//! SQLx-based persistence for session records.
//!
//! # Example
//!
//! ```rust,ignore
//! use reauth_db::{create_pool, PgSessionRepository, SessionRepository};
//!
//! let pool = create_pool("postgres://localhost/reauth").await?;
//! let sessions = PgSessionRepository::new(pool);
//! sessions.migrate().await?;
//!
//! let row = sessions.find_by_id(id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::PgSessionRepository;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use repo::*;
