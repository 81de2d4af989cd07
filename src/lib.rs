//! # Fleetpass (Phone OTP Authentication & Session Gate)
//!
//! `fleetpass` authenticates fleet-dashboard users with one-time codes sent
//! to their registered phone number, and gates every subsequent request on a
//! signed session credential.
//!
//! ## OTP lifecycle
//!
//! Issuing a code inserts a `PENDING` record holding a salted, keyed digest —
//! the plaintext is only dispatched out of band (WhatsApp template, or the
//! log in development) and is never stored. Verification targets the newest
//! unexpired `PENDING` record for the phone, enforces a 5-attempt ceiling
//! before comparing digests, and flips the record to `VERIFIED` or `FAILED`.
//! Records are retained indefinitely as the login audit trail.
//!
//! ## Sessions
//!
//! A successful verification issues an `HttpOnly` cookie carrying an
//! HMAC-signed snapshot of the account plus an expiry. The session gate
//! verifies the signature and expiry on every request; there is no
//! server-side session row and nothing unsigned is ever trusted.
//!
//! ## Error surface
//!
//! Business-rule rejections ("no outstanding code", "expired", "consumed")
//! intentionally share one generic message so callers probing phone numbers
//! learn nothing about record state.

pub mod api;
pub mod cli;
pub mod otp;
pub mod sms;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
