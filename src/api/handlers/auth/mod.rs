//! Phone-OTP login flow and session gating.
//!
//! The flow has two halves. Issuance (`/auth/otp/issue`) checks the phone
//! against the account store, persists a salted keyed digest of a fresh
//! 6-digit code, and dispatches the plaintext out of band. Verification
//! (`/auth/otp/verify`) targets the newest unexpired `PENDING` record,
//! enforces the attempt ceiling before comparing digests, and on success
//! issues the signed session cookie the [`gate`] checks on every request.
//!
//! ## Attempt budget
//!
//! Each record allows 5 attempts. The increment that reaches the ceiling
//! also flips the record to `FAILED` in the same statement; a `FAILED` or
//! `VERIFIED` record can never be verified again.
//!
//! ## Record retention
//!
//! OTP records are never deleted — they double as the login audit trail.
//! Issuing again simply adds a newer `PENDING` record; verification only
//! ever looks at the newest one.

pub(crate) mod gate;
pub(crate) mod issuance;
mod rate_limit;
pub(crate) mod session;
mod state;
mod storage;
pub(crate) mod types;
mod utils;
pub(crate) mod verification;

pub use rate_limit::{NoopRateLimiter, RateLimiter};
pub use state::{AuthConfig, AuthState};
