//! Pre-shared key access control for the `/api` routes.
//!
//! Keys are compared in constant time.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::{AppError, AppErrorWithRevision};

/// Header carrying the key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests that do not present the configured key. With no key
/// configured every request passes.
pub async fn psk_auth_layer(expected_psk: Option<String>, request: Request, next: Next) -> Response {
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let verdict = presented_key(request.headers()).map(|key| keys_match(key, &expected));

    match verdict {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!("Rejected {} {}: invalid API key", request.method(), request.uri());
            unauthorized("Invalid API key")
        }
        None => {
            tracing::debug!("Rejected {} {}: no API key", request.method(), request.uri());
            unauthorized("Missing or invalid API key")
        }
    }
}

/// The key from `x-api-key`, falling back to `Authorization: Bearer`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn unauthorized(message: &str) -> Response {
    AppErrorWithRevision {
        error: AppError::Unauthorized(message.to_string()),
        revision_id: 0,
    }
    .into_response()
}
