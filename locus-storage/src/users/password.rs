//! Password hashing using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use locus_core::StoreError;

/// Hash a plaintext password into a PHC-format Argon2id string with a fresh
/// random salt.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hashing {
            reason: e.to_string(),
        })
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash is
/// malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, StoreError> {
    let parsed = PasswordHash::new(hash).map_err(|e| StoreError::Hashing {
        reason: format!("invalid hash format: {}", e),
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(StoreError::Hashing {
            reason: format!("verify error: {}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() -> Result<(), StoreError> {
        let hash = hash_password("hunter2")?;
        assert!(verify_password("hunter2", &hash)?);
        Ok(())
    }

    #[test]
    fn wrong_password_does_not_match() -> Result<(), StoreError> {
        let hash = hash_password("hunter2")?;
        assert!(!verify_password("hunter3", &hash)?);
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> Result<(), StoreError> {
        assert_ne!(hash_password("same")?, hash_password("same")?);
        Ok(())
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }
}
