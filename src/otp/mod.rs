//! One-time code generation and hashing.

pub mod crypto;

use rand::Rng;

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

/// Draw a uniform 6-digit code.
///
/// The code is the only value ever sent to the user; callers must hash it
/// before persisting anything.
#[must_use]
pub fn generate_code() -> String {
    let code = rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn generate_code_stays_in_range() {
        for _ in 0..100 {
            let code: u32 = generate_code().parse().expect("numeric code");
            assert!((CODE_MIN..=CODE_MAX).contains(&code));
        }
    }
}
