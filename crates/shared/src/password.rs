//! Password hashing and password policy.
//!
//! Hashes are stored in PHC string format produced by Argon2id, so the
//! parameters travel with the hash and older hashes keep verifying after a
//! parameter bump.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Minimum number of characters accepted for any password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Passwords do not match")]
    Mismatch,

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed")]
    MalformedHash,
}

// Argon2id, 19 MiB, 2 passes, 1 lane.
const MEMORY_KIB: u32 = 19_456;
const PASSES: u32 = 2;
const LANES: u32 = 1;

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_KIB, PASSES, LANES, None)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Checks a candidate password against the length policy.
///
/// Length is counted in characters, not bytes. `min_length` below
/// [`MIN_PASSWORD_LENGTH`] is raised to it.
pub fn check_password_policy(password: &str, min_length: usize) -> Result<(), PasswordError> {
    let required = min_length.max(MIN_PASSWORD_LENGTH);
    if password.chars().count() < required {
        return Err(PasswordError::TooShort(required));
    }
    Ok(())
}

/// Checks a password and its confirmation, then the length policy.
pub fn check_password_confirmation(
    password: &str,
    confirmation: &str,
    min_length: usize,
) -> Result<(), PasswordError> {
    if password != confirmation {
        return Err(PasswordError::Mismatch);
    }
    check_password_policy(password, min_length)
}

/// Hashes a password with a fresh random salt.
///
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("correct horse").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// A wrong password is `Ok(false)`; only an unreadable hash is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(PasswordError::MalformedHash),
    }
}
