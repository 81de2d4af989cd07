//! Auth configuration and shared handler state.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::rate_limit::RateLimiter;
use crate::sms::OtpSender;

const DEFAULT_CODE_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_MAX_ATTEMPTS: i32 = 5;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    code_ttl_seconds: i64,
    max_attempts: i32,
    session_ttl_seconds: i64,
    frontend_base_url: String,
    disclose_codes: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            frontend_base_url,
            disclose_codes: false,
        }
    }

    #[must_use]
    pub fn with_code_ttl_seconds(mut self, seconds: i64) -> Self {
        self.code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: i32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    /// Development fallback: log the plaintext code when delivery fails.
    #[must_use]
    pub fn with_disclose_codes(mut self, disclose: bool) -> Self {
        self.disclose_codes = disclose;
        self
    }

    #[must_use]
    pub fn code_ttl_seconds(&self) -> i64 {
        self.code_ttl_seconds
    }

    #[must_use]
    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn disclose_codes(&self) -> bool {
        self.disclose_codes
    }

    /// Cookies are only marked `Secure` when the dashboard is served over
    /// HTTPS, so local development keeps working.
    pub(super) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    secret: SecretString,
    sender: OtpSender,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        secret: SecretString,
        sender: OtpSender,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            config,
            secret,
            sender,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The server-held secret keying both code digests and session tokens.
    pub(crate) fn secret(&self) -> &str {
        self.secret.expose_secret()
    }

    pub(super) fn sender(&self) -> &OtpSender {
        &self.sender
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}
