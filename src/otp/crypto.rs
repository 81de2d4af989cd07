//! Keyed hashing for one-time codes.
//!
//! A code is never stored in the clear: the database keeps a salted
//! HMAC-SHA512 digest and the salt, both base64url encoded. The HMAC key is
//! the server-held secret, so a leaked table alone is not enough to forge a
//! login.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

const SALT_LEN: usize = 16;

/// Create a fresh random salt for a single code.
#[must_use]
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Digest of `code || salt` keyed by the server secret.
///
/// Deterministic: the same inputs always produce the same digest, which is
/// what verification relies on.
///
/// # Errors
/// Returns an error if the HMAC cannot be keyed.
pub fn hash_code(code: &str, salt: &str, secret: &str) -> Result<String> {
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).context("failed to key code digest")?;
    mac.update(code.as_bytes());
    mac.update(salt.as_bytes());
    Ok(Base64UrlUnpadded::encode_string(
        &mac.finalize().into_bytes(),
    ))
}

/// Check a candidate code against a stored digest.
///
/// The comparison is constant-time and a length mismatch yields `false`
/// rather than an error, so callers can treat any non-match uniformly.
#[must_use]
pub fn verify_code(candidate: &str, stored_digest: &str, salt: &str, secret: &str) -> bool {
    hash_code(candidate, salt, secret).is_ok_and(|digest| {
        bool::from(digest.as_bytes().ct_eq(stored_digest.as_bytes()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";

    #[test]
    fn generate_salt_is_unique_and_decodable() {
        let first = generate_salt();
        let second = generate_salt();
        assert_ne!(first, second);

        let decoded = Base64UrlUnpadded::decode_vec(&first).ok();
        assert_eq!(decoded.map(|bytes| bytes.len()), Some(SALT_LEN));
    }

    #[test]
    fn hash_code_is_deterministic() -> anyhow::Result<()> {
        let salt = generate_salt();
        let first = hash_code("123456", &salt, SECRET)?;
        let second = hash_code("123456", &salt, SECRET)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn hash_code_differs_per_code_salt_and_secret() -> anyhow::Result<()> {
        let salt = generate_salt();
        let base = hash_code("123456", &salt, SECRET)?;

        assert_ne!(base, hash_code("654321", &salt, SECRET)?);
        assert_ne!(base, hash_code("123456", &generate_salt(), SECRET)?);
        assert_ne!(base, hash_code("123456", &salt, "another-secret")?);
        Ok(())
    }

    #[test]
    fn verify_code_accepts_matching_code() -> anyhow::Result<()> {
        let salt = generate_salt();
        let digest = hash_code("482913", &salt, SECRET)?;
        assert!(verify_code("482913", &digest, &salt, SECRET));
        Ok(())
    }

    #[test]
    fn verify_code_rejects_wrong_code() -> anyhow::Result<()> {
        let salt = generate_salt();
        let digest = hash_code("482913", &salt, SECRET)?;
        assert!(!verify_code("482914", &digest, &salt, SECRET));
        Ok(())
    }

    #[test]
    fn verify_code_rejects_wrong_salt() -> anyhow::Result<()> {
        let digest = hash_code("482913", &generate_salt(), SECRET)?;
        assert!(!verify_code("482913", &digest, &generate_salt(), SECRET));
        Ok(())
    }

    #[test]
    fn verify_code_is_false_on_length_mismatch() {
        let salt = generate_salt();
        assert!(!verify_code("482913", "short", &salt, SECRET));
        assert!(!verify_code("482913", "", &salt, SECRET));
    }
}
