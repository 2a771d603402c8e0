//! Session identifier and record types

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A persisted session.
///
/// The MAC key is generated once when the session is created and never
/// leaves the server. Expiry is computed, never stored: a record whose
/// validity window has passed stays readable until it is deleted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Session ID
    pub id: SessionId,
    /// Per-session MAC key
    pub mac_key: Vec<u8>,
    /// Creation time (epoch milliseconds)
    pub created_at: i64,
    /// How long after creation the session stays valid
    pub valid_for: Duration,
}

impl SessionRecord {
    /// Create a record stamped with the current time
    pub fn new(id: SessionId, mac_key: Vec<u8>, valid_for: Duration) -> Self {
        Self {
            id,
            mac_key,
            created_at: Utc::now().timestamp_millis(),
            valid_for,
        }
    }

    /// Validity duration in whole milliseconds, saturating at `i64::MAX`
    pub fn valid_for_millis(&self) -> i64 {
        i64::try_from(self.valid_for.as_millis()).unwrap_or(i64::MAX)
    }

    /// Expiry time (epoch milliseconds)
    pub fn expires_at_millis(&self) -> i64 {
        self.created_at.saturating_add(self.valid_for_millis())
    }

    /// Check expiry against a given time (epoch milliseconds)
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at_millis()
    }

    /// Check if the session is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("id", &self.id)
            .field("mac_key_length", &self.mac_key.len())
            .field("created_at", &self.created_at)
            .field("valid_for", &self.valid_for)
            .finish()
    }
}
