//! Password hashing and verification utilities.
//!
//! Argon2 is deliberately slow, so both entry points run on the blocking
//! thread pool instead of stalling the async executor.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

use crate::types::{UserError, UserResult};

/// Hash a password using Argon2 with a fresh random salt.
pub async fn hash_password(password: &str) -> UserResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|err| {
            error!(error = %err, "password hashing task failed");
            UserError::PasswordHashingFailed
        })?
}

/// Verify a password against a stored PHC hash.
///
/// An unparseable hash verifies as `false` rather than erroring, so a
/// corrupted row behaves like a wrong password.
pub async fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .map_err(|err| {
            error!(error = %err, "password verification task failed");
            UserError::PasswordHashingFailed
        })
}

fn hash_password_blocking(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!(error = %err, "argon2 hashing failed");
            UserError::PasswordHashingFailed
        })
}

fn verify_password_blocking(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
