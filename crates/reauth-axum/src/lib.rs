//! ReAuth Axum Integration
//!
//! Request gating for services built on the ReAuth session authority.
//!
//! # Overview
//!
//! - **Middleware**: [`SessionCheckLayer`] rejects requests that do not carry
//!   a valid session token in the `Authorization` header
//! - **Extractors**: [`SessionCredentials`] for the checked token,
//!   [`RequirePrivileged`] for callers holding the internal secret
//!
//! # Quick Start
//!
//! ```ignore
//! use reauth_axum::{SessionCheckConfig, SessionCheckLayer, SessionCredentials};
//! use axum::{Router, routing::get};
//!
//! async fn whoami(session: SessionCredentials) -> String {
//!     session.id.to_string()
//! }
//!
//! let config = SessionCheckConfig::new().exempt("/reauth/login");
//! let app = Router::new()
//!     .route("/reauth/whoami", get(whoami))
//!     .layer(SessionCheckLayer::new(sessions, config));
//! ```

pub mod context;
pub mod error;
pub mod extractors;
pub mod layer;

pub use context::SessionCredentials;
pub use error::GateError;
pub use extractors::RequirePrivileged;
pub use layer::{SessionCheckConfig, SessionCheckLayer, SessionCheckService};
