//! Session errors

use thiserror::Error;

use crate::crypto::HmacKeyError;

/// Session lifecycle errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token is structurally invalid (bad identifier or bad base64)
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    /// Tag mismatch or expired session
    #[error("authentication failed")]
    AuthenticationFailure,

    /// Privileged operation attempted without the internal secret
    #[error("forbidden")]
    Forbidden,

    /// The record store could not be reached or failed mid-operation
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedToken(_) => 400,
            Self::AuthenticationFailure => 401,
            Self::Forbidden => 403,
            Self::StoreUnavailable(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::AuthenticationFailure => "AUTHENTICATION_FAILURE",
            Self::Forbidden => "FORBIDDEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<reauth_db::DbError> for AuthError {
    fn from(err: reauth_db::DbError) -> Self {
        use reauth_db::DbError;

        match err {
            DbError::DuplicateIdentifier(id) => {
                tracing::error!(session_id = %id, "Session identifier collision");
                Self::Internal("duplicate session identifier".to_string())
            }
            DbError::Corrupt { id, reason } => {
                tracing::error!(session_id = %id, reason, "Corrupt session record");
                Self::Internal(format!("corrupt session record: {reason}"))
            }
            other => {
                tracing::error!("Database error: {}", other);
                Self::StoreUnavailable(other.to_string())
            }
        }
    }
}

impl From<HmacKeyError> for AuthError {
    fn from(err: HmacKeyError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MalformedToken("x").status_code(), 400);
        assert_eq!(AuthError::AuthenticationFailure.status_code(), 401);
        assert_eq!(AuthError::Forbidden.status_code(), 403);
        assert_eq!(AuthError::StoreUnavailable("down".into()).status_code(), 500);
    }

    #[test]
    fn test_db_errors_map_to_store_unavailable() {
        let err: AuthError = reauth_db::DbError::NotFound.into();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_duplicate_maps_to_internal() {
        let err: AuthError = reauth_db::DbError::DuplicateIdentifier(uuid::Uuid::nil()).into();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
