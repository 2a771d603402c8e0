//! In-memory session cache
//!
//! A performance mirror of recently read session records. Absence from the
//! cache never means a session is invalid; callers fall through to the
//! record store on a miss.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reauth_types::{SessionId, SessionRecord};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// The two backing maps, always mutated together under one lock.
#[derive(Debug, Default)]
struct CacheState {
    records: HashMap<SessionId, SessionRecord>,
    cached_at: HashMap<SessionId, Instant>,
    /// Bumped by every explicit eviction
    generation: u64,
}

impl CacheState {
    fn remove(&mut self, id: &SessionId) -> bool {
        let had_record = self.records.remove(id).is_some();
        let had_stamp = self.cached_at.remove(id).is_some();
        had_record || had_stamp
    }
}

/// Outcome of one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheSweep {
    /// Entries whose residency elapsed
    pub stale: usize,
    /// Entries present in only one of the two maps
    pub orphaned: usize,
}

impl CacheSweep {
    pub fn total(&self) -> usize {
        self.stale + self.orphaned
    }
}

/// Lock-protected session cache.
///
/// Every operation, including reads, takes the same exclusive lock so the
/// record map and the cached-at map are never observed out of step.
#[derive(Debug, Default)]
pub struct SessionCache {
    state: Mutex<CacheState>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached copy of a record, if present
    pub async fn get(&self, id: &SessionId) -> Option<SessionRecord> {
        let state = self.state.lock().await;
        let record = state.records.get(id).cloned();
        trace!(session_id = %id, hit = record.is_some(), "Session cache lookup");
        record
    }

    /// Insert or overwrite a record, stamping it with the current time
    pub async fn put(&self, record: SessionRecord) {
        let mut state = self.state.lock().await;
        let id = record.id;
        state.cached_at.insert(id, Instant::now());
        state.records.insert(id, record);
        trace!(session_id = %id, cache_size = state.records.len(), "Session cached");
    }

    /// Current eviction generation.
    ///
    /// Read it before fetching a record from the store and hand it to
    /// [`put_if_current`](Self::put_if_current), so a fill that raced an
    /// eviction is dropped instead of resurrecting the record.
    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }

    /// Insert a record unless an eviction happened since `generation` was
    /// read. Returns whether the record was cached.
    pub async fn put_if_current(&self, record: SessionRecord, generation: u64) -> bool {
        let mut state = self.state.lock().await;
        let id = record.id;
        if state.generation != generation {
            debug!(session_id = %id, "Cache fill dropped after concurrent eviction");
            return false;
        }
        state.cached_at.insert(id, Instant::now());
        state.records.insert(id, record);
        trace!(session_id = %id, cache_size = state.records.len(), "Session cached");
        true
    }

    /// Remove an entry. Returns whether anything was cached.
    ///
    /// Always advances the generation, even when nothing was cached: the
    /// record may be in flight from the store.
    pub async fn evict(&self, id: &SessionId) -> bool {
        let removed = {
            let mut state = self.state.lock().await;
            state.generation = state.generation.wrapping_add(1);
            state.remove(id)
        };
        if removed {
            trace!(session_id = %id, "Session evicted from cache");
        }
        removed
    }

    /// Remove entries cached longer than `residency`, and any entry that is
    /// present in only one of the two maps.
    pub async fn sweep(&self, residency: Duration) -> CacheSweep {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let stale: Vec<SessionId> = state
            .cached_at
            .iter()
            .filter(|(_, cached_at)| now.duration_since(**cached_at) > residency)
            .map(|(id, _)| *id)
            .collect();

        let orphaned: Vec<SessionId> = state
            .records
            .keys()
            .filter(|id| !state.cached_at.contains_key(*id))
            .chain(
                state
                    .cached_at
                    .keys()
                    .filter(|id| !state.records.contains_key(*id)),
            )
            .copied()
            .collect();

        for id in stale.iter().chain(orphaned.iter()) {
            state.remove(id);
        }

        let result = CacheSweep {
            stale: stale.len(),
            orphaned: orphaned.len(),
        };
        debug!(
            stale = result.stale,
            orphaned = result.orphaned,
            remaining = state.records.len(),
            "Session cache swept"
        );
        result
    }

    /// Whether an entry is cached
    pub async fn contains(&self, id: &SessionId) -> bool {
        self.state.lock().await.records.contains_key(id)
    }

    /// Number of cached records
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Identifiers currently cached
    pub async fn ids(&self) -> Vec<SessionId> {
        self.state.lock().await.records.keys().copied().collect()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.generation = state.generation.wrapping_add(1);
        state.records.clear();
        state.cached_at.clear();
    }

    #[cfg(test)]
    async fn insert_stamp_only(&self, id: SessionId) {
        self.state.lock().await.cached_at.insert(id, Instant::now());
    }

    #[cfg(test)]
    async fn backdate(&self, id: &SessionId, by: Duration) {
        let mut state = self.state.lock().await;
        if let Some(stamp) = state.cached_at.get_mut(id) {
            if let Some(earlier) = stamp.checked_sub(by) {
                *stamp = earlier;
            }
        }
    }
}
