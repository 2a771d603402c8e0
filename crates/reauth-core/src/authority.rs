//! Session authority
//!
//! The single entry point for creating, validating, expiring and deleting
//! sessions. Owns the session cache and mediates every record store access.

use std::collections::HashSet;
use std::sync::Arc;

use reauth_db::{CreateSession, SessionRepository};
use reauth_types::{SessionId, SessionRecord};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::config::SessionConfig;
use crate::crypto::{generate_mac_key, HmacKey};
use crate::token::{self, SessionToken};
use crate::AuthError;

/// Outcome of a full cache maintenance pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries whose cache residency elapsed
    pub stale: usize,
    /// Half-populated entries
    pub orphaned: usize,
    /// Entries whose record no longer exists in the store
    pub missing: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.stale + self.orphaned + self.missing
    }
}

/// Session authority
pub struct SessionAuthority<R: SessionRepository> {
    repo: Arc<R>,
    cache: SessionCache,
    config: SessionConfig,
}

impl<R: SessionRepository> SessionAuthority<R> {
    /// Create a new authority with an empty cache
    pub fn new(repo: Arc<R>, config: SessionConfig) -> Self {
        Self {
            repo,
            cache: SessionCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create and persist a new session, returning its token.
    ///
    /// The cache is not populated; the first validation does that.
    pub async fn create(&self) -> Result<SessionToken, AuthError> {
        let id = SessionId::new();
        let mac_key = generate_mac_key();
        let key = HmacKey::new(&mac_key)?;
        let record = SessionRecord::new(id, mac_key, self.config.valid_for);

        self.repo.create(CreateSession::from(&record)).await?;

        info!(session_id = %id, expires_at = record.expires_at_millis(), "Session created");
        Ok(SessionToken::mint(id, &key))
    }

    /// Resolve a record: cache first, then the store (populating the cache)
    pub async fn session(&self, id: &SessionId) -> Result<Option<SessionRecord>, AuthError> {
        if let Some(record) = self.cache.get(id).await {
            return Ok(Some(record));
        }

        let generation = self.cache.generation().await;
        let Some(row) = self.repo.find_by_id(id.0).await? else {
            debug!(session_id = %id, "Session not found");
            return Ok(None);
        };

        let record = SessionRecord::try_from(row)?;
        self.cache.put_if_current(record.clone(), generation).await;
        Ok(Some(record))
    }

    /// Check a tag against the session's key and its validity window
    pub async fn is_valid(&self, id: &SessionId, tag: &[u8]) -> Result<bool, AuthError> {
        let Some(record) = self.session(id).await? else {
            return Ok(false);
        };

        if !tag_matches(&record, tag) {
            return Ok(false);
        }

        if record.is_expired() {
            debug!(session_id = %id, "Session expired");
            return Ok(false);
        }

        Ok(true)
    }

    /// Like [`is_valid`](Self::is_valid) with a base64 tag. Bad base64 is
    /// reported as invalid, never as an error.
    pub async fn is_valid_base64(&self, id: &SessionId, tag: &str) -> Result<bool, AuthError> {
        match token::decode_tag(tag) {
            Ok(tag) => self.is_valid(id, &tag).await,
            Err(e) => {
                debug!(session_id = %id, error = %e, "Rejecting undecodable tag");
                Ok(false)
            }
        }
    }

    /// Unknown and deleted sessions count as expired
    pub async fn is_expired(&self, id: &SessionId) -> Result<bool, AuthError> {
        Ok(self
            .session(id)
            .await?
            .map_or(true, |record| record.is_expired()))
    }

    /// Revoke a session on behalf of its holder.
    ///
    /// The tag must match the session's key; expiry is not checked, so an
    /// expired session can still be revoked. Unknown sessions are already
    /// gone and succeed.
    pub async fn revoke(&self, id: &SessionId, tag: &[u8]) -> Result<(), AuthError> {
        let Some(record) = self.session(id).await? else {
            debug!(session_id = %id, "Revoke of unknown session");
            return Ok(());
        };

        if !tag_matches(&record, tag) {
            warn!(session_id = %id, "Revoke refused, tag does not match");
            return Err(AuthError::AuthenticationFailure);
        }

        self.delete(id).await
    }

    /// Remove a session from the store and the cache. Idempotent.
    pub async fn delete(&self, id: &SessionId) -> Result<(), AuthError> {
        let removed = self.repo.delete(id.0).await?;
        self.cache.evict(id).await;

        if removed {
            info!(session_id = %id, "Session deleted");
        } else {
            debug!(session_id = %id, "Delete of unknown session");
        }
        Ok(())
    }

    // =========================================================================
    // Cache maintenance
    // =========================================================================

    /// Whether the session is currently mirrored in the cache
    pub async fn is_cached(&self, id: &SessionId) -> bool {
        self.cache.contains(id).await
    }

    /// Drop the cached copy only; the stored record is untouched
    pub async fn uncache(&self, id: &SessionId) -> bool {
        self.cache.evict(id).await
    }

    /// Sweep stale and half-populated entries, then evict entries whose
    /// record has disappeared from the store.
    ///
    /// The store is asked once, outside the cache lock, which of the
    /// remaining ids still exist. On a store failure the check is skipped
    /// until the next pass.
    pub async fn sweep_cache(&self) -> SweepReport {
        let swept = self.cache.sweep(self.config.cache_residency).await;
        let mut report = SweepReport {
            stale: swept.stale,
            orphaned: swept.orphaned,
            missing: 0,
        };

        let cached = self.cache.ids().await;
        if !cached.is_empty() {
            let uuids: Vec<Uuid> = cached.iter().map(SessionId::as_uuid).collect();
            match self.repo.existing_ids(&uuids).await {
                Ok(existing) => {
                    let existing: HashSet<Uuid> = existing.into_iter().collect();
                    for id in cached.iter().filter(|id| !existing.contains(&id.0)) {
                        if self.cache.evict(id).await {
                            report.missing += 1;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Store check failed during cache sweep"),
            }
        }

        if report.total() > 0 {
            info!(
                stale = report.stale,
                orphaned = report.orphaned,
                missing = report.missing,
                "Session cache cleaned"
            );
        }
        report
    }
}

/// Constant-time check of a tag against the record's key
fn tag_matches(record: &SessionRecord, tag: &[u8]) -> bool {
    let key = match HmacKey::new(&record.mac_key) {
        Ok(key) => key,
        Err(e) => {
            warn!(session_id = %record.id, error = %e, "Stored session key unusable");
            return false;
        }
    };

    let matches = token::verify(&record.id, tag, &key);
    if !matches {
        debug!(session_id = %record.id, "Session tag mismatch");
    }
    matches
}

impl<R: SessionRepository> std::fmt::Debug for SessionAuthority<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
