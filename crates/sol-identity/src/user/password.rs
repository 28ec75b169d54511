//! Temporary credential generation.
//!
//! New accounts get a random throwaway password that the user never sees;
//! they set their own through the credential-setup ticket. The generated
//! value still has to satisfy the connection's complexity policy, and the
//! character classes must not sit at fixed positions (a Fisher-Yates
//! shuffle defeats positional-pattern attacks).

use rand::seq::SliceRandom;
use rand::Rng;
use secrecy::SecretString;

/// Length of generated temporary passwords.
pub const TEMP_PASSWORD_LENGTH: usize = 16;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*";

/// Generates a random temporary password of `length` characters with at
/// least one lowercase, one uppercase, one digit, and one symbol.
///
/// The returned [`SecretString`] zeroizes its contents on drop, so the
/// secret is cleared from memory once the remote call is done with it.
pub fn generate_temporary_password(length: usize) -> SecretString {
    debug_assert!(length >= 4, "need room for all four character classes");

    let mut rng = rand::rng();
    let combined: Vec<u8> = [LOWER, UPPER, DIGITS, SPECIAL].concat();

    let mut chars: Vec<u8> = Vec::with_capacity(length);
    chars.push(LOWER[rng.random_range(0..LOWER.len())]);
    chars.push(UPPER[rng.random_range(0..UPPER.len())]);
    chars.push(DIGITS[rng.random_range(0..DIGITS.len())]);
    chars.push(SPECIAL[rng.random_range(0..SPECIAL.len())]);

    while chars.len() < length {
        chars.push(combined[rng.random_range(0..combined.len())]);
    }

    // Fisher-Yates, so the mandatory classes don't occupy fixed positions
    chars.shuffle(&mut rng);

    // The alphabet is pure ASCII, so byte-to-char conversion cannot fail
    let password: String = chars.into_iter().map(char::from).collect();
    SecretString::new(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_generated_length() {
        for _ in 0..20 {
            let password = generate_temporary_password(TEMP_PASSWORD_LENGTH);
            assert_eq!(password.expose_secret().len(), TEMP_PASSWORD_LENGTH);
        }
    }

    #[test]
    fn test_output_is_ascii_and_exact_length() {
        for _ in 0..50 {
            let password = generate_temporary_password(TEMP_PASSWORD_LENGTH);
            let secret = password.expose_secret();
            assert!(secret.is_ascii());
            assert_eq!(secret.chars().count(), TEMP_PASSWORD_LENGTH);
        }
    }

    #[test]
    fn test_contains_all_character_classes() {
        for _ in 0..50 {
            let password = generate_temporary_password(TEMP_PASSWORD_LENGTH);
            let secret = password.expose_secret();
            assert!(secret.bytes().any(|c| LOWER.contains(&c)), "no lowercase in {secret}");
            assert!(secret.bytes().any(|c| UPPER.contains(&c)), "no uppercase in {secret}");
            assert!(secret.bytes().any(|c| DIGITS.contains(&c)), "no digit in {secret}");
            assert!(secret.bytes().any(|c| SPECIAL.contains(&c)), "no symbol in {secret}");
        }
    }

    #[test]
    fn test_no_fixed_positions() {
        // Without the shuffle the first character would always be lowercase.
        // Over 100 generations the odds of that happening by chance are
        // (26/70)^100, i.e. effectively zero.
        let all_first_lowercase = (0..100)
            .map(|_| generate_temporary_password(TEMP_PASSWORD_LENGTH))
            .all(|p| {
                let first = p.expose_secret().bytes().next().unwrap();
                LOWER.contains(&first)
            });
        assert!(!all_first_lowercase, "character classes appear to sit at fixed positions");
    }

    #[test]
    fn test_minimum_length_still_covers_classes() {
        let password = generate_temporary_password(4);
        let secret = password.expose_secret();
        assert_eq!(secret.len(), 4);
        assert!(secret.bytes().any(|c| SPECIAL.contains(&c)));
    }
}
