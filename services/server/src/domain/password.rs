//! Salted adaptive hashing for passwords and recovery codes.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use anyhow::anyhow;

use crate::error::ApiError;

/// Hash a secret (password or recovery code) with Argon2id and a fresh salt.
pub fn hash_secret(secret: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow!("argon2 hash: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored hash. The comparison inside the argon2
/// library is constant-time; a malformed stored hash counts as a mismatch.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}
