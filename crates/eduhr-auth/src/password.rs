//! Random password generation and Argon2 hashing.
//!
//! Federated accounts never authenticate with a local password. Their
//! password is replaced by a random value nobody knows, stored only as an
//! Argon2id hash, so local credential login becomes impossible for them.
//! Hashes use a random `OsRng` salt and the PHC string format.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()";

/// Length of generated passwords.
pub const GENERATED_PASSWORD_LENGTH: usize = 12;

/// Errors from password hashing and verification.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing the password failed.
    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string.
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Generates a random password of `length` characters.
///
/// Uses letters and digits, plus `!@#$%^&*()` when `special_chars` is set.
#[must_use]
pub fn generate_password(length: usize, special_chars: bool) -> String {
    let mut charset = ALPHANUMERIC.to_vec();
    if special_chars {
        charset.extend_from_slice(SPECIAL);
    }

    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// Hashes a password with Argon2id for storage.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verifies a plaintext password against a stored PHC hash.
///
/// # Errors
///
/// Returns [`PasswordError::MalformedHash`] if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Generates a random password nobody knows and returns its hash.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if hashing fails.
pub fn unusable_password_hash(special_chars: bool) -> Result<String, PasswordError> {
    hash_password(&generate_password(GENERATED_PASSWORD_LENGTH, special_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_password_length_and_charset() {
        let password = generate_password(12, false);
        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));

        let password = generate_password(64, true);
        assert_eq!(password.len(), 64);
        assert!(
            password
                .bytes()
                .all(|b| ALPHANUMERIC.contains(&b) || SPECIAL.contains(&b))
        );
    }

    #[test]
    fn test_generate_password_is_random() {
        assert_ne!(generate_password(32, false), generate_password(32, false));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_verify_malformed_hash() {
        let err = verify_password("secret", "not-a-hash").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[test]
    fn test_unusable_password_hashes_differ() {
        let a = unusable_password_hash(false).unwrap();
        let b = unusable_password_hash(true).unwrap();
        assert_ne!(a, b);
    }
}
