//! Rejections produced by the session gate and extractors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Gate and extractor rejections.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No `Authorization` header.
    #[error("session required")]
    MissingSession,

    /// Header present but not `<id>.<base64 tag>`.
    #[error("malformed session token")]
    MalformedSession,

    /// Unknown, forged, revoked or expired session.
    #[error("invalid session")]
    InvalidSession,

    /// Privileged operation without the internal secret.
    #[error("forbidden")]
    Forbidden,

    /// Session store could not answer.
    #[error("session store unavailable")]
    StoreUnavailable,

    /// Gate used without the state it needs.
    #[error("internal gate error: {0}")]
    Internal(&'static str),
}

impl GateError {
    /// HTTP status for this rejection.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSession | Self::InvalidSession => StatusCode::UNAUTHORIZED,
            Self::MalformedSession => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::StoreUnavailable | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for response bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSession => "MISSING_SESSION",
            Self::MalformedSession => "MALFORMED_SESSION",
            Self::InvalidSession => "INVALID_SESSION",
            Self::Forbidden => "FORBIDDEN",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct GateErrorResponse {
    error: GateErrorDetail,
}

#[derive(Debug, Serialize)]
struct GateErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let body = GateErrorResponse {
            error: GateErrorDetail {
                code: self.code(),
                message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
