//! Password hashing using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

/// Hashing failed. Verification never returns this; a bad stored hash
/// simply fails to verify.
#[derive(Debug, Error)]
#[error("password hash error: {0}")]
pub struct HashError(String);

/// Hash a plaintext password into an Argon2id PHC string.
///
/// # Errors
///
/// Returns [`HashError`] if the underlying hasher fails.
pub fn hash(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// Comparison happens inside the `argon2` crate with constant-time
/// semantics. A malformed stored hash verifies as `false`.
#[must_use]
pub fn verify(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
