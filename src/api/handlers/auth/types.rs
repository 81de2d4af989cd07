//! Request/response schemas for the OTP endpoints.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IssueOtpRequest {
    pub phone: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IssueOtpResponse {
    pub status: bool,
    pub message: String,
    pub phone: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub phone: i64,
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpResponse {
    pub status: bool,
    pub message: String,
    pub user: AccountProfile,
}

/// Sanitized account projection returned at login and embedded in the
/// session credential. Field names match what the dashboard consumes.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub phone: i64,
    pub role: String,
    pub vehicle_group: String,
    pub status: String,
    pub assigned_vehicles: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub status: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON error body used by every failure path.
pub(crate) fn error_body(message: impl Into<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn issue_request_round_trips() -> Result<()> {
        let request: IssueOtpRequest = serde_json::from_value(serde_json::json!({
            "phone": 9_876_543_210_i64
        }))?;
        assert_eq!(request.phone, 9_876_543_210);
        Ok(())
    }

    #[test]
    fn issue_request_rejects_missing_phone() {
        let result: Result<IssueOtpRequest, _> = serde_json::from_value(serde_json::json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn verify_request_requires_both_fields() {
        let missing_otp: Result<VerifyOtpRequest, _> =
            serde_json::from_value(serde_json::json!({ "phone": 9_876_543_210_i64 }));
        assert!(missing_otp.is_err());

        let missing_phone: Result<VerifyOtpRequest, _> =
            serde_json::from_value(serde_json::json!({ "otp": "123456" }));
        assert!(missing_phone.is_err());
    }

    #[test]
    fn account_profile_serializes_camel_case() -> Result<()> {
        let profile = AccountProfile {
            id: "6569f9a1".to_string(),
            name: "Asha".to_string(),
            phone: 9_876_543_210,
            role: "manager".to_string(),
            vehicle_group: "north".to_string(),
            status: "active".to_string(),
            assigned_vehicles: vec!["KA01AB1234".to_string()],
        };
        let value = serde_json::to_value(&profile)?;
        let group = value
            .get("vehicleGroup")
            .and_then(serde_json::Value::as_str)
            .context("missing vehicleGroup")?;
        assert_eq!(group, "north");
        assert!(value.get("assignedVehicles").is_some());
        assert!(value.get("vehicle_group").is_none());

        let decoded: AccountProfile = serde_json::from_value(value)?;
        assert_eq!(decoded, profile);
        Ok(())
    }

    #[test]
    fn error_body_shape() -> Result<()> {
        let Json(body) = error_body("Invalid OTP provided.");
        let value = serde_json::to_value(&body)?;
        assert_eq!(value, serde_json::json!({ "error": "Invalid OTP provided." }));
        Ok(())
    }
}
