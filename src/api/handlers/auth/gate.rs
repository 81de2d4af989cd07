//! Session gate: the request-time allow/deny decision.
//!
//! Every request passes through here. Routes on the public list (the OTP
//! endpoints, logout, health, static assets, API docs) are always reachable
//! so a user can authenticate at all. Everything else requires a valid
//! signed session credential; without one the request is redirected to the
//! login entry point, and an authenticated visit to the login entry point is
//! redirected back to the landing resource.

use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::session::{extract_session_token, verify_session_token};
use super::state::AuthState;

pub(crate) const LOGIN_PATH: &str = "/login";
const LANDING_PATH: &str = "/";

/// Prefix-matched, mirroring the dashboard's public route table.
const PUBLIC_PREFIXES: &[&str] = &[
    "/auth/otp/issue",
    "/auth/otp/verify",
    "/auth/logout",
    "/health",
    "/assets",
    "/favicon.ico",
    "/swagger-ui",
    "/api-docs",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// The gate itself never changes authentication state; it only reads the
/// credential that login set and logout cleared.
pub async fn session_gate(
    auth_state: Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_public(path) {
        return next.run(request).await;
    }

    let claims = extract_session_token(request.headers())
        .and_then(|token| verify_session_token(&token, auth_state.secret()));

    match claims {
        Some(claims) => {
            if path == LOGIN_PATH {
                return Redirect::temporary(LANDING_PATH).into_response();
            }
            // Handlers read the verified snapshot from request extensions.
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        None if path == LOGIN_PATH => next.run(request).await,
        None => Redirect::temporary(LOGIN_PATH).into_response(),
    }
}
