//! Signed session credential: issue at login, verify at the gate, clear at
//! logout.
//!
//! The token is `base64url(claims_json) . base64url(hmac_sha256(claims_json))`
//! keyed by the server secret. The claims carry the sanitized account
//! snapshot plus an expiry, so the gate can authenticate a request without a
//! database round trip, and nothing client-side is trusted without the MAC.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::error;

use super::state::{AuthConfig, AuthState};
use super::types::{AccountProfile, LogoutResponse};

type HmacSha256 = Hmac<Sha256>;

pub(crate) const SESSION_COOKIE_NAME: &str = "fleetpass_session";

/// What the session token asserts: who verified, and until when.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionClaims {
    pub user: AccountProfile,
    pub exp: i64,
}

impl SessionClaims {
    pub(crate) fn new(user: AccountProfile, ttl_seconds: i64) -> Self {
        Self {
            user,
            exp: Utc::now().timestamp() + ttl_seconds,
        }
    }

    fn expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Serialize and MAC the claims into a cookie-safe token.
pub(crate) fn sign_session_token(claims: &SessionClaims, secret: &str) -> Option<String> {
    let payload = serde_json::to_vec(claims).ok()?;
    let tag = mac_bytes(&payload, secret)?;
    Some(format!(
        "{}.{}",
        Base64UrlUnpadded::encode_string(&payload),
        Base64UrlUnpadded::encode_string(&tag)
    ))
}

/// Verify signature and expiry; any failure is just "no session".
pub(crate) fn verify_session_token(token: &str, secret: &str) -> Option<SessionClaims> {
    let (payload_b64, tag_b64) = token.split_once('.')?;
    let payload = Base64UrlUnpadded::decode_vec(payload_b64).ok()?;
    let tag = Base64UrlUnpadded::decode_vec(tag_b64).ok()?;

    let expected = mac_bytes(&payload, secret)?;
    if !bool::from(expected.as_slice().ct_eq(&tag)) {
        return None;
    }

    let claims: SessionClaims = serde_json::from_slice(&payload).ok()?;
    if claims.expired() {
        return None;
    }
    Some(claims)
}

fn mac_bytes(payload: &[u8], secret: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Build the `HttpOnly` login cookie carrying the signed token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let secure = config.session_cookie_secure();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = config.session_cookie_secure();
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session token from the cookie, or a bearer header for
/// non-browser clients.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Expire the session cookie. Logout is idempotent: there is no server-side
/// session row to delete, only the client credential to clear.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }

    (
        StatusCode::OK,
        response_headers,
        Json(LogoutResponse {
            status: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}
