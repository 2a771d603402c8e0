//! Session token codec
//!
//! Wire format: `<session id>.<base64 tag>`, where the tag is
//! HMAC-SHA256 over the canonical string form of the session id, keyed by
//! the session's own MAC key. Only the first `.` separates the two parts.

use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use reauth_types::SessionId;

use crate::crypto::{HmacKey, TAG_LENGTH};
use crate::AuthError;

/// Separator between the identifier and the tag
pub const SEPARATOR: char = '.';

/// Compute the tag for a session identifier
pub fn mint(id: &SessionId, key: &HmacKey) -> [u8; TAG_LENGTH] {
    key.sign(id.to_string().as_bytes())
}

/// Render a token from its parts
pub fn encode(id: &SessionId, tag: &[u8]) -> String {
    format!("{id}{SEPARATOR}{}", STANDARD.encode(tag))
}

/// Split a token into identifier and raw tag bytes
pub fn decode(token: &str) -> Result<(SessionId, Vec<u8>), AuthError> {
    let (id, tag) = token
        .split_once(SEPARATOR)
        .ok_or(AuthError::MalformedToken("missing separator"))?;

    let id = SessionId::parse(id).map_err(|_| AuthError::MalformedToken("invalid session id"))?;
    let tag = decode_tag(tag)?;

    Ok((id, tag))
}

/// Decode a base64 (standard alphabet) tag
pub fn decode_tag(tag: &str) -> Result<Vec<u8>, AuthError> {
    STANDARD
        .decode(tag)
        .map_err(|_| AuthError::MalformedToken("invalid base64 tag"))
}

/// Recompute the tag and compare in constant time
pub fn verify(id: &SessionId, candidate: &[u8], key: &HmacKey) -> bool {
    key.verify(id.to_string().as_bytes(), candidate)
}

/// A decoded session token
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub id: SessionId,
    pub tag: Vec<u8>,
}

impl SessionToken {
    /// Mint a token for a session
    pub fn mint(id: SessionId, key: &HmacKey) -> Self {
        Self {
            id,
            tag: mint(&id, key).to_vec(),
        }
    }

    /// Tag as base64
    pub fn tag_base64(&self) -> String {
        STANDARD.encode(&self.tag)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode(&self.id, &self.tag))
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl FromStr for SessionToken {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, tag) = decode(s)?;
        Ok(Self { id, tag })
    }
}
