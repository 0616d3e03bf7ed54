//! Password hashing and verification (Argon2id, PHC strings).

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

/// Hashing failed. Carries no detail on purpose.
#[derive(Debug, Error)]
#[error("failed to hash password")]
pub struct HashError;

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|_| HashError)?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|_| HashError)?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| HashError)?
        .to_string();
    Ok(phc)
}

/// Verify a password against a stored PHC hash. Comparison inside the
/// verifier is constant-time. An unparseable hash verifies as false.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
