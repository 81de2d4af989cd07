//! Rate limiting seam for the OTP flow.
//!
//! The server currently imposes no issuance or verification frequency limit
//! of its own (the client enforces a 30-second re-request cooldown), so the
//! wired implementation is [`NoopRateLimiter`]. A real limiter plugs in here
//! without touching the handlers.

#[derive(Clone, Copy, Debug)]
pub enum RateLimitAction {
    IssueCode,
    VerifyCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_phone(&self, phone: i64, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_phone(&self, _phone: i64, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}
