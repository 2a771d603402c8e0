//! HTTP handlers

mod health;
mod session;

pub use health::{health, ready};
pub use session::{create_session, invalidate_session, session_expired, session_valid};
