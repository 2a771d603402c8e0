//! Router-level tests for the session gate

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use dashmap::DashMap;
use reauth_axum::{SessionCheckConfig, SessionCheckLayer, SessionCredentials};
use reauth_core::{AuthError, SessionService, SessionToken, SharedSessionService};
use reauth_types::{SessionId, SessionRecord};
use tower::ServiceExt;

// ============================================================================
// Stub session service
// ============================================================================

#[derive(Clone)]
struct StubSession {
    tag: Vec<u8>,
    expired: bool,
    cached: bool,
}

#[derive(Default)]
struct StubSessions {
    sessions: DashMap<SessionId, StubSession>,
    failing: AtomicBool,
}

impl StubSessions {
    fn add(&self, expired: bool, cached: bool) -> SessionToken {
        let token = SessionToken {
            id: SessionId::new(),
            tag: vec![7u8; 32],
        };
        self.sessions.insert(
            token.id,
            StubSession {
                tag: token.tag.clone(),
                expired,
                cached,
            },
        );
        token
    }

    fn check(&self) -> Result<(), AuthError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable("stub offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionService for StubSessions {
    async fn create(&self) -> Result<SessionToken, AuthError> {
        self.check()?;
        Ok(self.add(false, false))
    }

    async fn is_valid(&self, id: &SessionId, tag: &[u8]) -> Result<bool, AuthError> {
        self.check()?;
        Ok(self
            .sessions
            .get(id)
            .is_some_and(|s| s.tag == tag && !s.expired))
    }

    async fn is_valid_base64(&self, _id: &SessionId, _tag: &str) -> Result<bool, AuthError> {
        unimplemented!("not used by the gate")
    }

    async fn is_expired(&self, id: &SessionId) -> Result<bool, AuthError> {
        self.check()?;
        Ok(self.sessions.get(id).map_or(true, |s| s.expired))
    }

    async fn delete(&self, id: &SessionId) -> Result<(), AuthError> {
        self.check()?;
        self.sessions.remove(id);
        Ok(())
    }

    async fn revoke(&self, _id: &SessionId, _tag: &[u8]) -> Result<(), AuthError> {
        unimplemented!("not used by the gate")
    }

    async fn session(&self, _id: &SessionId) -> Result<Option<SessionRecord>, AuthError> {
        Ok(None)
    }

    async fn is_cached(&self, id: &SessionId) -> bool {
        self.sessions.get(id).is_some_and(|s| s.cached)
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn whoami(session: SessionCredentials) -> String {
    session.id.to_string()
}

fn app(stub: Arc<StubSessions>) -> Router {
    let sessions: SharedSessionService = stub;
    let config = SessionCheckConfig::new()
        .exempt("/open")
        .presence_only("/presence");

    Router::new()
        .route("/open", get(|| async { "open" }))
        .route("/presence", get(whoami))
        .route("/protected", get(whoami))
        .layer(SessionCheckLayer::new(sessions, config))
}

fn request(path: &str, auth: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn error_code(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    json["error"]["code"].as_str().unwrap().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_exempt_path_needs_no_header() {
    let app = app(Arc::new(StubSessions::default()));

    let response = app.oneshot(request("/open", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_header_is_401() {
    let app = app(Arc::new(StubSessions::default()));

    let response = app.oneshot(request("/protected", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "MISSING_SESSION");
}

#[tokio::test]
async fn test_malformed_header_is_400() {
    let app = app(Arc::new(StubSessions::default()));

    let response = app
        .oneshot(request("/protected", Some("not-a-token".into())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "MALFORMED_SESSION");
}

#[tokio::test]
async fn test_valid_session_reaches_handler() {
    let stub = Arc::new(StubSessions::default());
    let token = stub.add(false, true);
    let app = app(Arc::clone(&stub));

    let response = app
        .oneshot(request("/protected", Some(token.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, token.id.to_string().as_bytes());
}

#[tokio::test]
async fn test_bearer_prefix_accepted() {
    let stub = Arc::new(StubSessions::default());
    let token = stub.add(false, false);
    let app = app(Arc::clone(&stub));

    let response = app
        .oneshot(request("/protected", Some(format!("Bearer {token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forged_tag_is_401() {
    let stub = Arc::new(StubSessions::default());
    let mut token = stub.add(false, true);
    token.tag[0] ^= 1;
    let app = app(Arc::clone(&stub));

    let response = app
        .oneshot(request("/protected", Some(token.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "INVALID_SESSION");
    // Not expired, so not purged
    assert!(stub.sessions.contains_key(&token.id));
}

#[tokio::test]
async fn test_cached_expired_session_is_purged() {
    let stub = Arc::new(StubSessions::default());
    let token = stub.add(true, true);
    let app = app(Arc::clone(&stub));

    let response = app
        .oneshot(request("/protected", Some(token.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!stub.sessions.contains_key(&token.id));
}

#[tokio::test]
async fn test_uncached_expired_session_is_left_alone() {
    let stub = Arc::new(StubSessions::default());
    let token = stub.add(true, false);
    let app = app(Arc::clone(&stub));

    let response = app
        .oneshot(request("/protected", Some(token.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(stub.sessions.contains_key(&token.id));
}

#[tokio::test]
async fn test_store_failure_is_500_not_401() {
    let stub = Arc::new(StubSessions::default());
    let token = stub.add(false, true);
    stub.failing.store(true, Ordering::SeqCst);
    let app = app(Arc::clone(&stub));

    let response = app
        .oneshot(request("/protected", Some(token.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(response).await, "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_presence_only_skips_validation() {
    let stub = Arc::new(StubSessions::default());
    let unknown = SessionToken {
        id: SessionId::new(),
        tag: vec![1u8; 32],
    };
    stub.failing.store(true, Ordering::SeqCst);
    let app = app(Arc::clone(&stub));

    let response = app
        .oneshot(request("/presence", Some(unknown.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_presence_only_still_requires_header() {
    let app = app(Arc::new(StubSessions::default()));

    let response = app.oneshot(request("/presence", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
