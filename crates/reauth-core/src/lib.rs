//! ReAuth Core - Session lifecycle
//!
//! Issues, validates, caches and revokes opaque session tokens:
//! - Token codec (HMAC-SHA256 tag over the session identifier)
//! - Session cache with a periodic sweeper
//! - Session authority tying codec, cache and record store together

pub mod authority;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod service;
pub mod sweeper;
pub mod token;

pub use authority::{SessionAuthority, SweepReport};
pub use cache::{CacheSweep, SessionCache};
pub use config::{InternalSecret, SessionConfig};
pub use crypto::{constant_time_eq, generate_mac_key, HmacKey, HmacKeyError};
pub use error::AuthError;
pub use service::{SessionService, SharedSessionService};
pub use sweeper::CacheSweeper;
pub use token::SessionToken;
