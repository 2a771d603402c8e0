//! Router assembly

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use reauth_axum::{SessionCheckConfig, SessionCheckLayer};
use reauth_extension::{HostRegistrations, ROUTE_PREFIX};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, Level};

use crate::handlers;
use crate::state::AppState;

/// Full paths of the session endpoints
pub mod paths {
    pub const CREATE: &str = "/reauth/session/create";
    pub const VALID: &str = "/reauth/session/valid";
    pub const EXPIRED: &str = "/reauth/session/expired";
    pub const INVALIDATE: &str = "/reauth/session/invalidate";
}

/// Build the HTTP router.
///
/// Session and extension routes live under `/reauth` behind the session
/// gate. Creation is exempt (it is guarded by the internal secret instead);
/// the validity, expiry and invalidation endpoints only need a well-formed
/// token. Health routes sit outside the gate.
///
/// An extension whose routes collide with routes already mounted is
/// dropped whole, exemptions included; the rest still mount.
pub fn build_router(state: AppState, registrations: HostRegistrations) -> Router {
    let HostRegistrations { extensions, cors } = registrations;

    let session_routes = Router::new()
        .route("/session/create", post(handlers::create_session))
        .route("/session/valid", get(handlers::session_valid))
        .route("/session/expired", get(handlers::session_expired))
        .route("/session/invalidate", delete(handlers::invalidate_session))
        .with_state(state.clone());

    let mut reauth_routes = session_routes;
    let mut exempt_paths = Vec::new();
    for extension in extensions {
        match mount_extension(reauth_routes.clone(), extension.routes) {
            Some(merged) => {
                reauth_routes = merged;
                exempt_paths.extend(extension.exempt_paths);
            }
            None => error!(
                owner = %extension.owner,
                "Extension routes conflict with mounted routes, extension not mounted"
            ),
        }
    }

    let gate = SessionCheckConfig::new()
        .exempt(paths::CREATE)
        .exempt_all(exempt_paths)
        .presence_only(paths::VALID)
        .presence_only(paths::EXPIRED)
        .presence_only(paths::INVALIDATE);

    let health_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .with_state(state.clone());

    // Outermost first; CORS answers preflights before the gate sees them
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors.to_layer());

    Router::new()
        .nest(ROUTE_PREFIX, reauth_routes)
        .layer(SessionCheckLayer::new(Arc::clone(&state.sessions), gate))
        .merge(health_routes)
        .layer(middleware)
}

/// Merge one extension's routers onto `base`; `None` when axum rejects an
/// overlapping route
fn mount_extension(base: Router, routes: Vec<Router>) -> Option<Router> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        routes.into_iter().fold(base, Router::merge)
    }))
    .ok()
}
