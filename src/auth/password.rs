//! Password hashing and verification using Argon2

use crate::utils::error::{GateError, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hash a password using Argon2 with a fresh random salt.
///
/// Fails closed: any internal fault surfaces as an error, never as a weak or
/// empty digest.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GateError::Crypto(format!("failed to hash password: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verify a password against its digest in constant time.
///
/// A mismatch is `Ok(false)`; a digest that cannot be parsed is an error,
/// since every digest in the store was produced by `hash_password`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| GateError::Crypto(format!("failed to parse password digest: {}", e)))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(GateError::Crypto(format!(
            "password verification failed: {}",
            e
        ))),
    }
}
