//! Configuration types for the session authority

use std::time::Duration;

use crate::crypto::constant_time_eq;

/// Session lifecycle configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a freshly created session stays valid
    pub valid_for: Duration,
    /// How long an entry may stay in the cache; also the sweep interval
    pub cache_residency: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            valid_for: Duration::from_secs(30 * 60),      // 30 minutes
            cache_residency: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

impl SessionConfig {
    /// Create a config with default durations
    pub fn new() -> Self {
        Self::default()
    }

    /// Set session validity
    #[must_use]
    pub fn with_valid_for(mut self, valid_for: Duration) -> Self {
        self.valid_for = valid_for;
        self
    }

    /// Set cache residency
    #[must_use]
    pub fn with_cache_residency(mut self, residency: Duration) -> Self {
        self.cache_residency = residency;
        self
    }
}

/// Pre-shared secret that authorizes privileged callers.
///
/// Callers present it in the `Authorization` header, optionally with the
/// `REAUTH:` marker already applied.
#[derive(Clone)]
pub struct InternalSecret {
    qualified: String,
}

impl InternalSecret {
    /// Marker prefixed to the secret on the wire
    pub const MARKER: &'static str = "REAUTH:";

    /// Placeholder shipped in sample configuration. Refused at startup.
    pub const INSECURE_DEFAULT: &'static str =
        "<change required, otherwise reauth can be compromised!>";

    pub fn new(secret: impl AsRef<str>) -> Self {
        Self {
            qualified: format!("{}{}", Self::MARKER, secret.as_ref()),
        }
    }

    /// True when the secret is empty or still the shipped placeholder
    pub fn is_insecure_default(&self) -> bool {
        let raw = &self.qualified[Self::MARKER.len()..];
        raw.trim().is_empty() || raw == Self::INSECURE_DEFAULT
    }

    /// Compare a presented header value against the secret in constant time
    pub fn matches_header(&self, header: &str) -> bool {
        let presented = if header.starts_with(Self::MARKER) {
            header.to_owned()
        } else {
            format!("{}{header}", Self::MARKER)
        };
        constant_time_eq(presented.as_bytes(), self.qualified.as_bytes())
    }
}

impl std::fmt::Debug for InternalSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalSecret").finish_non_exhaustive()
    }
}
