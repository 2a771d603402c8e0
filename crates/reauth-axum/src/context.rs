//! Session credentials carried by a gated request.

use reauth_core::token::{self, SessionToken};
use reauth_types::SessionId;

use crate::error::GateError;

/// Credentials parsed from the `Authorization` header.
///
/// Inserted into request extensions by the session gate.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    /// Session identifier
    pub id: SessionId,
    /// Raw tag bytes
    pub tag: Vec<u8>,
}

impl SessionCredentials {
    /// Optional scheme prefix accepted in front of the token
    pub const BEARER_PREFIX: &'static str = "Bearer ";

    /// Parse an `Authorization` header value
    pub fn parse(header: &str) -> Result<Self, GateError> {
        let raw = header.trim();
        let raw = raw.strip_prefix(Self::BEARER_PREFIX).unwrap_or(raw);

        let (id, tag) = token::decode(raw).map_err(|e| {
            tracing::debug!(error = %e, "Rejecting malformed session header");
            GateError::MalformedSession
        })?;

        Ok(Self { id, tag })
    }

    /// Reassemble the token
    pub fn token(&self) -> SessionToken {
        SessionToken {
            id: self.id,
            tag: self.tag.clone(),
        }
    }
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
