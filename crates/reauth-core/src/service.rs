//! Object-safe session service
//!
//! What the request gate, the HTTP handlers and extensions hold: the
//! authority's public contract behind a trait object, independent of the
//! record store type.

use std::sync::Arc;

use async_trait::async_trait;
use reauth_db::SessionRepository;
use reauth_types::{SessionId, SessionRecord};

use crate::authority::SessionAuthority;
use crate::token::SessionToken;
use crate::AuthError;

/// Shared handle to the session service
pub type SharedSessionService = Arc<dyn SessionService>;

/// Session lifecycle operations
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a new session
    async fn create(&self) -> Result<SessionToken, AuthError>;

    /// Check a raw tag
    async fn is_valid(&self, id: &SessionId, tag: &[u8]) -> Result<bool, AuthError>;

    /// Check a base64 tag
    async fn is_valid_base64(&self, id: &SessionId, tag: &str) -> Result<bool, AuthError>;

    /// Whether the session is expired or unknown
    async fn is_expired(&self, id: &SessionId) -> Result<bool, AuthError>;

    /// Revoke a session unconditionally
    async fn delete(&self, id: &SessionId) -> Result<(), AuthError>;

    /// Revoke a session for a caller holding its tag. A wrong tag fails with
    /// [`AuthError::AuthenticationFailure`]; unknown sessions succeed.
    async fn revoke(&self, id: &SessionId, tag: &[u8]) -> Result<(), AuthError>;

    /// Resolve a session record
    async fn session(&self, id: &SessionId) -> Result<Option<SessionRecord>, AuthError>;

    /// Whether the session is mirrored in the cache
    async fn is_cached(&self, id: &SessionId) -> bool;
}

#[async_trait]
impl<R: SessionRepository + 'static> SessionService for SessionAuthority<R> {
    async fn create(&self) -> Result<SessionToken, AuthError> {
        SessionAuthority::create(self).await
    }

    async fn is_valid(&self, id: &SessionId, tag: &[u8]) -> Result<bool, AuthError> {
        SessionAuthority::is_valid(self, id, tag).await
    }

    async fn is_valid_base64(&self, id: &SessionId, tag: &str) -> Result<bool, AuthError> {
        SessionAuthority::is_valid_base64(self, id, tag).await
    }

    async fn is_expired(&self, id: &SessionId) -> Result<bool, AuthError> {
        SessionAuthority::is_expired(self, id).await
    }

    async fn delete(&self, id: &SessionId) -> Result<(), AuthError> {
        SessionAuthority::delete(self, id).await
    }

    async fn revoke(&self, id: &SessionId, tag: &[u8]) -> Result<(), AuthError> {
        SessionAuthority::revoke(self, id, tag).await
    }

    async fn session(&self, id: &SessionId) -> Result<Option<SessionRecord>, AuthError> {
        SessionAuthority::session(self, id).await
    }

    async fn is_cached(&self, id: &SessionId) -> bool {
        SessionAuthority::is_cached(self, id).await
    }
}
