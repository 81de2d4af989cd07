use utoipa::OpenApi;

use super::handlers::{auth, health};

/// OpenAPI document for the served routes. `/` and `/login` are
/// intentionally undocumented; they stand in for the dashboard pages.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::issuance::issue_otp,
        auth::verification::verify_otp,
        auth::session::logout,
    ),
    components(schemas(
        auth::types::IssueOtpRequest,
        auth::types::IssueOtpResponse,
        auth::types::VerifyOtpRequest,
        auth::types::VerifyOtpResponse,
        auth::types::AccountProfile,
        auth::types::LogoutResponse,
        auth::types::ErrorResponse,
    )),
    tags(
        (name = "fleetpass", description = "Fleet dashboard authentication service"),
        (name = "auth", description = "Phone OTP login, verification and logout")
    )
)]
pub struct ApiDoc;
