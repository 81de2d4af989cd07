//! Input validation helpers for the OTP handlers.

use regex::Regex;

/// Phones are stored as plain digits (country code included, no `+`).
/// Accept 10 to 15 digits, the E.164 length envelope.
#[must_use]
pub(super) fn valid_phone(phone: i64) -> bool {
    (1_000_000_000..=999_999_999_999_999).contains(&phone)
}

/// Submitted codes must be exactly six digits; anything else is rejected
/// before a record is touched, so a malformed submission never consumes an
/// attempt.
#[must_use]
pub(super) fn valid_code_format(code: &str) -> bool {
    Regex::new(r"^[0-9]{6}$").is_ok_and(|regex| regex.is_match(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_phone_accepts_ten_to_fifteen_digits() {
        assert!(valid_phone(9_876_543_210));
        assert!(valid_phone(919_876_543_210));
        assert!(valid_phone(999_999_999_999_999));
    }

    #[test]
    fn valid_phone_rejects_short_or_negative() {
        assert!(!valid_phone(0));
        assert!(!valid_phone(12345));
        assert!(!valid_phone(-9_876_543_210));
        assert!(!valid_phone(1_000_000_000_000_000));
    }

    #[test]
    fn valid_code_format_accepts_six_digits() {
        assert!(valid_code_format("000000"));
        assert!(valid_code_format("482913"));
    }

    #[test]
    fn valid_code_format_rejects_everything_else() {
        assert!(!valid_code_format(""));
        assert!(!valid_code_format("12345"));
        assert!(!valid_code_format("1234567"));
        assert!(!valid_code_format("12345a"));
        assert!(!valid_code_format(" 123456"));
    }
}
