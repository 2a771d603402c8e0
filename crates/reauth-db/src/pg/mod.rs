//! PostgreSQL repository implementations

mod session;

pub use session::PgSessionRepository;
