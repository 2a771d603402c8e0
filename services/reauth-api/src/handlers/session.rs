//! Session endpoints under `/reauth/session`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reauth_axum::{RequirePrivileged, SessionCredentials};

use crate::error::ApiResult;
use crate::state::AppState;

/// POST /reauth/session/create - Mint a session (internal callers only)
///
/// Responds 201 with the token as a JSON string.
pub async fn create_session(
    _privileged: RequirePrivileged,
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<String>)> {
    let token = state.sessions.create().await?;
    tracing::info!(session_id = %token.id, "Session created");
    Ok((StatusCode::CREATED, Json(token.to_string())))
}

/// GET /reauth/session/valid - Whether the presented token is valid
pub async fn session_valid(
    State(state): State<AppState>,
    credentials: SessionCredentials,
) -> ApiResult<Json<bool>> {
    let valid = state
        .sessions
        .is_valid(&credentials.id, &credentials.tag)
        .await?;
    Ok(Json(valid))
}

/// GET /reauth/session/expired - Whether the presented session is expired
///
/// Unknown sessions count as expired.
pub async fn session_expired(
    State(state): State<AppState>,
    credentials: SessionCredentials,
) -> ApiResult<Json<bool>> {
    let expired = state.sessions.is_expired(&credentials.id).await?;
    Ok(Json(expired))
}

/// DELETE /reauth/session/invalidate - Revoke the presented session
///
/// The tag must match even when the session has expired; a wrong tag is 401.
/// Revoking an unknown session succeeds.
pub async fn invalidate_session(
    State(state): State<AppState>,
    credentials: SessionCredentials,
) -> ApiResult<StatusCode> {
    state
        .sessions
        .revoke(&credentials.id, &credentials.tag)
        .await?;
    tracing::info!(session_id = %credentials.id, "Session invalidated");
    Ok(StatusCode::OK)
}
