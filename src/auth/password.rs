//! Password hashing and verification.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password with Argon2id and a fresh salt.
///
/// # Errors
///
/// Returns `AppError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("hash password: {e}")))
}

/// Verification uses the parameters embedded in the stored hash.
///
/// # Errors
///
/// Returns `AppError::Internal` if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("parse password hash: {e}")))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("zaghouan2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("zaghouan2024", &hash).unwrap());
        assert!(!verify_password("zaghouan2025", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        assert_ne!(hash_password("secret").unwrap(), hash_password("secret").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("secret", "not-a-hash").is_err());
    }
}
