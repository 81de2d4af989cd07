//! One-time code issuance.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{insert_otp, lookup_account};
use super::types::{error_body, ErrorResponse, IssueOtpRequest, IssueOtpResponse};
use super::utils::valid_phone;
use crate::otp::{self, crypto};
use crate::sms::OtpMessage;

/// Issue a fresh code for a known phone number.
///
/// Every call creates one new `PENDING` record; delivery is attempted after
/// the record exists and a delivery failure does not fail the request.
#[utoipa::path(
    post,
    path = "/auth/otp/issue",
    request_body = IssueOtpRequest,
    responses(
        (status = 200, description = "Code issued and dispatched", body = IssueOtpResponse),
        (status = 400, description = "Missing or invalid phone number", body = ErrorResponse),
        (status = 404, description = "No account for this phone number", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn issue_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<IssueOtpRequest>>,
) -> impl IntoResponse {
    let request: IssueOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("Phone number is required"),
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

    if auth_state
        .rate_limiter()
        .check_phone(request.phone, RateLimitAction::IssueCode)
        == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            error_body("Too many requests. Please wait before retrying."),
        )
            .into_response();
    }

    // Unknown phones get a 404 and no record; the account store is the
    // allow-list for this login flow.
    let account = match lookup_account(&pool, request.phone).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_body("Account not found. Please contact your administrator."),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to lookup account: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
                .into_response();
        }
    };

    let code = otp::generate_code();
    let salt = crypto::generate_salt();
    let digest = match crypto::hash_code(&code, &salt, auth_state.secret()) {
        Ok(digest) => digest,
        Err(err) => {
            error!("Failed to hash code: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Could not send OTP"),
            )
                .into_response();
        }
    };

    let config = auth_state.config();
    if let Err(err) = insert_otp(
        &pool,
        account.phone,
        &digest,
        &salt,
        config.code_ttl_seconds(),
        config.max_attempts(),
    )
    .await
    {
        error!("Failed to persist otp record: {err}");
        return (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
            .into_response();
    }

    // Record first, then delivery: a provider outage must not invalidate
    // the code that is already checkable.
    let message = OtpMessage {
        phone: account.phone,
        code,
    };
    if let Err(err) = auth_state.sender().send(&message).await {
        error!("Failed to dispatch one-time code: {err}");
        if config.disclose_codes() {
            // Development fallback only.
            info!(
                phone = message.phone,
                code = %message.code,
                "one-time code (delivery failed, dev disclosure)"
            );
        }
    }

    (
        StatusCode::OK,
        Json(IssueOtpResponse {
            status: true,
            message: "OTP sent successfully".to_string(),
            phone: account.phone,
        }),
    )
        .into_response()
}
