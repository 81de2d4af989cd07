//! One-time code verification and login.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::session::{session_cookie, sign_session_token, SessionClaims};
use super::state::AuthState;
use super::storage::{
    latest_pending_otp, lookup_account, mark_failed, mark_verified, record_failed_attempt,
    AccountRecord,
};
use super::types::{error_body, AccountProfile, ErrorResponse, VerifyOtpRequest, VerifyOtpResponse};
use super::utils::{valid_code_format, valid_phone};
use crate::otp::crypto;

/// Check a submitted code against the newest outstanding record.
///
/// Rejections deliberately share the 400 status and use generic wording:
/// "never requested", "expired" and "already consumed" are indistinguishable
/// to a caller probing phone numbers.
#[utoipa::path(
    post,
    path = "/auth/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted; session issued", body = VerifyOtpResponse),
        (status = 400, description = "Missing fields, no outstanding code, exhausted attempts, or wrong code", body = ErrorResponse),
        (status = 404, description = "Account vanished since issuance", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("Phone number and OTP are required"),
            )
                .into_response()
        }
    };

    if !valid_phone(request.phone) {
        return (
            StatusCode::BAD_REQUEST,
            error_body("A valid phone number is required"),
        )
            .into_response();
    }

    // Malformed codes are a validation failure, not a wrong guess: they are
    // rejected here and never consume an attempt.
    if !valid_code_format(&request.otp) {
        return (
            StatusCode::BAD_REQUEST,
            error_body("A valid 6-digit OTP is required"),
        )
            .into_response();
    }

    if auth_state
        .rate_limiter()
        .check_phone(request.phone, RateLimitAction::VerifyCode)
        == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            error_body("Too many requests. Please wait before retrying."),
        )
            .into_response();
    }

    let record = match latest_pending_otp(&pool, request.phone).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("Invalid or expired OTP. Please request a new one."),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to lookup pending otp: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
                .into_response();
        }
    };

    // Ceiling check before the hash check: an exhausted record is rejected
    // without consuming another slot, whatever code was submitted.
    if record.attempts >= record.max_attempts {
        if let Err(err) = mark_failed(&pool, record.id).await {
            error!("Failed to mark otp record failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
                .into_response();
        }
        return (
            StatusCode::BAD_REQUEST,
            error_body("Too many failed attempts. Please request a new OTP."),
        )
            .into_response();
    }

    if !crypto::verify_code(
        &request.otp,
        &record.code_hash,
        &record.salt,
        auth_state.secret(),
    ) {
        if let Err(err) = record_failed_attempt(&pool, record.id).await {
            error!("Failed to record otp attempt: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
                .into_response();
        }
        return (
            StatusCode::BAD_REQUEST,
            error_body("Invalid OTP provided."),
        )
            .into_response();
    }

    if let Err(err) = mark_verified(&pool, record.id).await {
        error!("Failed to mark otp record verified: {err}");
        return (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
            .into_response();
    }

    // Issuance already validated the account; this is the safeguard path.
    let account = match lookup_account(&pool, request.phone).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, error_body("Account not found."))
                .into_response()
        }
        Err(err) => {
            error!("Failed to lookup account: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
                .into_response();
        }
    };

    let user = profile_from(account);
    let claims = SessionClaims::new(user.clone(), auth_state.config().session_ttl_seconds());
    let Some(token) = sign_session_token(&claims, auth_state.secret()) else {
        error!("Failed to sign session token");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body("Could not create session"),
        )
            .into_response();
    };

    let mut headers = HeaderMap::new();
    match session_cookie(auth_state.config(), &token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Could not create session"),
            )
                .into_response();
        }
    }

    (
        StatusCode::OK,
        headers,
        Json(VerifyOtpResponse {
            status: true,
            message: "OTP verified successfully".to_string(),
            user,
        }),
    )
        .into_response()
}

fn profile_from(account: AccountRecord) -> AccountProfile {
    AccountProfile {
        id: account.id.to_string(),
        name: account.name,
        phone: account.phone,
        role: account.role,
        vehicle_group: account.vehicle_group,
        status: account.status,
        assigned_vehicles: account.assigned_vehicles,
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::NoopRateLimiter;
    use super::super::state::{AuthConfig, AuthState};
    use super::*;
    use crate::sms::{LogOtpSender, OtpSender};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new("http://localhost:3000".to_string()),
            SecretString::from("verify-secret".to_string()),
            OtpSender::Log(LogOtpSender),
            Arc::new(NoopRateLimiter),
        ))
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")
            .expect("lazy pool")
    }

    #[tokio::test]
    async fn missing_payload_is_a_client_error() {
        let response = verify_otp(Extension(lazy_pool()), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_code_is_rejected_without_db_access() {
        for otp in ["", "12345", "1234567", "12345a"] {
            let response = verify_otp(
                Extension(lazy_pool()),
                Extension(auth_state()),
                Some(Json(VerifyOtpRequest {
                    phone: 9_876_543_210,
                    otp: otp.to_string(),
                })),
            )
            .await
            .into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "otp: {otp:?}");
        }
    }

    #[tokio::test]
    async fn invalid_phone_is_rejected_without_db_access() {
        let response = verify_otp(
            Extension(lazy_pool()),
            Extension(auth_state()),
            Some(Json(VerifyOtpRequest {
                phone: 42,
                otp: "123456".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn profile_projection_keeps_all_public_fields() {
        let account = AccountRecord {
            id: Uuid::nil(),
            name: "Asha".to_string(),
            phone: 9_876_543_210,
            role: "manager".to_string(),
            vehicle_group: "north".to_string(),
            status: "active".to_string(),
            assigned_vehicles: vec!["KA01AB1234".to_string()],
        };
        let profile = profile_from(account);
        assert_eq!(profile.id, Uuid::nil().to_string());
        assert_eq!(profile.phone, 9_876_543_210);
        assert_eq!(profile.assigned_vehicles, vec!["KA01AB1234".to_string()]);
    }
}
