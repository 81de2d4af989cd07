//! Minimal landing and login endpoints.
//!
//! The dashboard UI itself lives elsewhere; these two routes exist so the
//! session gate has a protected landing resource and a public login entry
//! point to redirect between.

use axum::{extract::Extension, response::IntoResponse, Json};
use serde_json::json;

use super::auth::session::SessionClaims;

/// Landing resource. The gate only lets authenticated requests through, and
/// it stashes the verified claims in request extensions on the way in.
pub async fn home(claims: Option<Extension<SessionClaims>>) -> impl IntoResponse {
    let user = claims.map(|Extension(claims)| claims.user);
    Json(json!({
        "status": true,
        "user": user,
    }))
}

/// Login entry point; unauthenticated requests land here.
pub async fn login() -> impl IntoResponse {
    Json(json!({
        "status": false,
        "message": "Sign in with your registered phone number",
    }))
}
