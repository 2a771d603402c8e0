//! Axum extractors for gated handlers.
//!
//! # Usage
//!
//! ```ignore
//! use reauth_axum::{RequirePrivileged, SessionCredentials};
//!
//! // Reads the credentials the session gate attached (401 if absent)
//! async fn valid(session: SessionCredentials) -> String {
//!     session.id.to_string()
//! }
//!
//! // Requires the internal secret in `Authorization` (403 otherwise)
//! async fn create(_: RequirePrivileged) -> &'static str {
//!     "ok"
//! }
//! ```

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use reauth_core::InternalSecret;

use crate::context::SessionCredentials;
use crate::error::GateError;

impl<S> FromRequestParts<S> for SessionCredentials
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionCredentials>()
            .cloned()
            .ok_or(GateError::MissingSession)
    }
}

/// Extractor that requires the caller to present the internal secret.
///
/// The `Authorization` header may carry the secret with or without the
/// `REAUTH:` marker. Rejects with 403 before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct RequirePrivileged;

impl<S> FromRequestParts<S> for RequirePrivileged
where
    InternalSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = InternalSecret::from_ref(state);

        let presented = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(GateError::Forbidden)?;

        if secret.matches_header(presented) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Privileged request with wrong secret");
            Err(GateError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[derive(Clone)]
    struct TestState {
        secret: InternalSecret,
    }

    impl FromRef<TestState> for InternalSecret {
        fn from_ref(state: &TestState) -> Self {
            state.secret.clone()
        }
    }

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/reauth/session/create");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn state() -> TestState {
        TestState {
            secret: InternalSecret::new("s3cret-value"),
        }
    }

    #[tokio::test]
    async fn test_privileged_accepts_secret() {
        let state = state();
        for value in ["s3cret-value", "REAUTH:s3cret-value"] {
            let mut parts = parts(Some(value));
            assert!(RequirePrivileged::from_request_parts(&mut parts, &state)
                .await
                .is_ok());
        }
    }

    #[tokio::test]
    async fn test_privileged_rejects_wrong_or_missing() {
        let state = state();
        for value in [Some("wrong"), Some("REAUTH:"), None] {
            let mut parts = parts(value);
            let err = RequirePrivileged::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
            assert!(matches!(err, GateError::Forbidden));
        }
    }

    #[tokio::test]
    async fn test_credentials_missing_without_gate() {
        let mut parts = parts(None);
        let err = SessionCredentials::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::MissingSession));
    }
}
