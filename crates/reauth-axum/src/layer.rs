//! Tower middleware layer that enforces session presence and validity.
//!
//! Every request whose path is not exempt must carry a session token in the
//! `Authorization` header. Presence-only paths get their credentials parsed
//! and attached but are not validated; the handler answers the validity
//! question itself.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::{IntoResponse, Response};
use reauth_core::SharedSessionService;
use tower::{Layer, Service};
use tracing::{debug, error, warn};

use crate::context::SessionCredentials;
use crate::error::GateError;

/// Configuration for the session gate.
#[derive(Debug, Clone, Default)]
pub struct SessionCheckConfig {
    /// Paths that bypass the gate entirely.
    pub exempt_paths: HashSet<String>,
    /// Paths that require a well-formed token but skip validation.
    pub presence_only_paths: HashSet<String>,
}

impl SessionCheckConfig {
    /// Create an empty config (everything gated).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempt a path from the gate.
    #[must_use]
    pub fn exempt(mut self, path: impl Into<String>) -> Self {
        self.exempt_paths.insert(normalize(&path.into()));
        self
    }

    /// Exempt several paths from the gate.
    #[must_use]
    pub fn exempt_all<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.exempt_paths
            .extend(paths.into_iter().map(|p| normalize(&p.into())));
        self
    }

    /// Require only a well-formed token on a path.
    #[must_use]
    pub fn presence_only(mut self, path: impl Into<String>) -> Self {
        self.presence_only_paths.insert(normalize(&path.into()));
        self
    }

    /// Whether a request path bypasses the gate.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths.contains(normalize(path).as_str())
    }

    /// Whether a request path only needs a well-formed token.
    pub fn is_presence_only(&self, path: &str) -> bool {
        self.presence_only_paths.contains(normalize(path).as_str())
    }
}

/// Strip a trailing slash so `/a/` and `/a` match the same entry.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Tower layer that gates requests on a valid session.
#[derive(Clone)]
pub struct SessionCheckLayer {
    sessions: SharedSessionService,
    config: Arc<SessionCheckConfig>,
}

impl SessionCheckLayer {
    /// Create a new gate backed by the given session service.
    #[must_use]
    pub fn new(sessions: SharedSessionService, config: SessionCheckConfig) -> Self {
        Self {
            sessions,
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for SessionCheckLayer {
    type Service = SessionCheckService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionCheckService {
            inner,
            sessions: Arc::clone(&self.sessions),
            config: Arc::clone(&self.config),
        }
    }
}

/// The session gate service.
#[derive(Clone)]
pub struct SessionCheckService<S> {
    inner: S,
    sessions: SharedSessionService,
    config: Arc<SessionCheckConfig>,
}

impl<S> Service<Request<Body>> for SessionCheckService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness; leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let sessions = Arc::clone(&self.sessions);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let path = req.uri().path().to_owned();
            if config.is_exempt(&path) {
                return inner.call(req).await;
            }

            let header = authorization(&req);
            let outcome = match header {
                Ok(value) => check(&sessions, &config, &path, &value).await,
                Err(rejection) => Err(rejection),
            };

            match outcome {
                Ok(credentials) => {
                    req.extensions_mut().insert(credentials);
                    inner.call(req).await
                }
                Err(rejection) => Ok(rejection.into_response()),
            }
        })
    }
}

/// Owned copy of the `Authorization` header.
fn authorization(req: &Request<Body>) -> Result<String, GateError> {
    req.headers()
        .get(header::AUTHORIZATION)
        .ok_or(GateError::MissingSession)?
        .to_str()
        .map(str::to_owned)
        .map_err(|_| GateError::MalformedSession)
}

async fn check(
    sessions: &SharedSessionService,
    config: &SessionCheckConfig,
    path: &str,
    header: &str,
) -> Result<SessionCredentials, GateError> {
    let credentials = SessionCredentials::parse(header)?;

    if config.is_presence_only(path) {
        return Ok(credentials);
    }

    match sessions.is_valid(&credentials.id, &credentials.tag).await {
        Ok(true) => Ok(credentials),
        Ok(false) => {
            debug!(session_id = %credentials.id, path, "Rejected invalid session");
            purge_if_expired(sessions, &credentials).await;
            Err(GateError::InvalidSession)
        }
        Err(e) => {
            error!(session_id = %credentials.id, error = %e, "Session check failed");
            Err(GateError::StoreUnavailable)
        }
    }
}

/// Delete a session that is still cached but has expired.
async fn purge_if_expired(sessions: &SharedSessionService, credentials: &SessionCredentials) {
    if !sessions.is_cached(&credentials.id).await {
        return;
    }

    match sessions.is_expired(&credentials.id).await {
        Ok(true) => {
            if let Err(e) = sessions.delete(&credentials.id).await {
                warn!(session_id = %credentials.id, error = %e, "Failed to purge expired session");
            } else {
                debug!(session_id = %credentials.id, "Purged expired session");
            }
        }
        Ok(false) => {}
        Err(e) => warn!(session_id = %credentials.id, error = %e, "Expiry check failed"),
    }
}
