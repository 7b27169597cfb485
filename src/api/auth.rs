//! Credential check at the API boundary.
//!
//! The scheme itself is pluggable by deployment: when no admin token is
//! configured the mutating endpoints are open (dev mode); when one is set,
//! callers present it via a dedicated header or a bearer token.

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};

pub const ADMIN_TOKEN_HEADER: &str = "x-conductor-admin-token";

pub fn expected_admin_token() -> Option<String> {
    std::env::var("CONDUCTOR_API_ADMIN_TOKEN")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn extract_bearer_token(raw: &str) -> Option<&str> {
    raw.strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .map(str::trim)
}

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(extract_bearer_token)
        })
}

pub fn ensure_authorized(headers: &HeaderMap) -> std::result::Result<(), (StatusCode, String)> {
    let Some(expected) = expected_admin_token() else {
        return Ok(());
    };

    if presented_token(headers).is_some_and(|v| v == expected) {
        return Ok(());
    }

    Err((
        StatusCode::UNAUTHORIZED,
        "auth failed (missing/invalid admin token)".to_string(),
    ))
}
