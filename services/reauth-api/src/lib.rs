//! ReAuth API
//!
//! Session service: mints HMAC-bound session tokens for internal callers,
//! answers validity questions, and hosts extension routes behind the
//! session gate.
//!
//! ## REST Endpoints
//!
//! - `POST /reauth/session/create` - Create a session (internal secret)
//! - `GET /reauth/session/valid` - Validity of the presented session
//! - `GET /reauth/session/expired` - Expiry of the presented session
//! - `DELETE /reauth/session/invalidate` - Revoke the presented session
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
