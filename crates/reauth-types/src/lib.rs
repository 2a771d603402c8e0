//! ReAuth Types - Shared domain types
//!
//! Types shared between the session store, the session authority and the
//! HTTP surface:
//! - Session identifiers
//! - Persisted session records

pub mod session;

pub use session::*;
