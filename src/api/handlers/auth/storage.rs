//! Database helpers for accounts and OTP lifecycle records.
//!
//! OTP rows are append-only history: issuance inserts, verification mutates
//! status/attempts, nothing deletes. Expired rows simply stop matching the
//! pending lookup.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// Sanitized account row; credential-like columns are never selected.
pub(crate) struct AccountRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) phone: i64,
    pub(crate) role: String,
    pub(crate) vehicle_group: String,
    pub(crate) status: String,
    pub(crate) assigned_vehicles: Vec<String>,
}

/// The fields verification needs from the newest pending row.
pub(super) struct OtpRecord {
    pub(super) id: Uuid,
    pub(super) code_hash: String,
    pub(super) salt: String,
    pub(super) attempts: i32,
    pub(super) max_attempts: i32,
}

pub(super) async fn lookup_account(pool: &PgPool, phone: i64) -> Result<Option<AccountRecord>> {
    let query = r"
        SELECT id, name, phone, role, vehicle_group, status,
               COALESCE(assigned_vehicles, ARRAY[]::text[]) AS assigned_vehicles
        FROM accounts
        WHERE phone = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(phone)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account")?;

    Ok(row.map(|row| AccountRecord {
        id: row.get("id"),
        name: row.get("name"),
        phone: row.get("phone"),
        role: row.get("role"),
        vehicle_group: row.get("vehicle_group"),
        status: row.get("status"),
        assigned_vehicles: row.get("assigned_vehicles"),
    }))
}

/// Insert one new `PENDING` row. Earlier pending rows for the same phone are
/// left alone; verification always targets the newest one.
pub(super) async fn insert_otp(
    pool: &PgPool,
    phone: i64,
    code_hash: &str,
    salt: &str,
    ttl_seconds: i64,
    max_attempts: i32,
) -> Result<()> {
    let query = r"
        INSERT INTO otp_codes
            (phone, code_hash, salt, purpose, status, attempts, max_attempts, expires_at)
        VALUES ($1, $2, $3, 'LOGIN', 'PENDING', 0, $4, NOW() + ($5 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(phone)
        .bind(code_hash)
        .bind(salt)
        .bind(max_attempts)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert otp record")?;
    Ok(())
}

/// Newest unexpired `PENDING` row for this phone, if any. "None pending" and
/// "all expired" are indistinguishable here on purpose.
pub(super) async fn latest_pending_otp(pool: &PgPool, phone: i64) -> Result<Option<OtpRecord>> {
    let query = r"
        SELECT id, code_hash, salt, attempts, max_attempts
        FROM otp_codes
        WHERE phone = $1
          AND status = 'PENDING'
          AND expires_at > NOW()
        ORDER BY created_at DESC
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(phone)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup pending otp")?;

    Ok(row.map(|row| OtpRecord {
        id: row.get("id"),
        code_hash: row.get("code_hash"),
        salt: row.get("salt"),
        attempts: row.get("attempts"),
        max_attempts: row.get("max_attempts"),
    }))
}

/// Count a wrong code. The increment and the ceiling transition happen in
/// one statement, so the attempt that exhausts the budget also flips the row
/// to `FAILED` — single-row atomicity is all this relies on.
pub(super) async fn record_failed_attempt(pool: &PgPool, id: Uuid) -> Result<()> {
    let query = r"
        UPDATE otp_codes
        SET attempts = attempts + 1,
            status = CASE WHEN attempts + 1 >= max_attempts THEN 'FAILED' ELSE status END,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to record otp attempt")?;
    Ok(())
}

pub(super) async fn mark_failed(pool: &PgPool, id: Uuid) -> Result<()> {
    update_status(pool, id, "FAILED").await
}

pub(super) async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<()> {
    update_status(pool, id, "VERIFIED").await
}

async fn update_status(pool: &PgPool, id: Uuid, status: &str) -> Result<()> {
    let query = r"
        UPDATE otp_codes
        SET status = $2, updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(status)
        .execute(pool)
        .instrument(span)
        .await
        .with_context(|| format!("failed to mark otp record {status}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_record_holds_values() {
        let record = AccountRecord {
            id: Uuid::nil(),
            name: "Asha".to_string(),
            phone: 9_876_543_210,
            role: "manager".to_string(),
            vehicle_group: "north".to_string(),
            status: "active".to_string(),
            assigned_vehicles: vec!["KA01AB1234".to_string()],
        };
        assert_eq!(record.phone, 9_876_543_210);
        assert_eq!(record.assigned_vehicles.len(), 1);
    }

    #[test]
    fn otp_record_exposes_attempt_ceiling() {
        let record = OtpRecord {
            id: Uuid::nil(),
            code_hash: "digest".to_string(),
            salt: "salt".to_string(),
            attempts: 5,
            max_attempts: 5,
        };
        assert!(record.attempts >= record.max_attempts);
    }
}
