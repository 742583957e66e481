//! Password policy and hashing.
//!
//! Passwords are stored as bcrypt hashes. Accounts that never set a
//! password (the demo accounts) fall back to the configured shared default
//! password, which is a placeholder for local development and must be
//! overridden or removed for any real deployment.

use crate::error::{AuthError, Result};

/// Minimum password length enforced by default.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

/// Password rules applied on registration and password changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum number of characters.
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password against the policy.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordTooShort` if the password is too short.
    pub fn validate(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::PasswordTooShort {
                min_length: self.min_length,
            });
        }
        Ok(())
    }
}

/// Hash a password with bcrypt.
///
/// # Errors
///
/// Returns `AuthError::Hash` if bcrypt fails (e.g. an invalid cost).
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a bcrypt hash.
///
/// # Errors
///
/// Returns `AuthError::Hash` if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check supplied login credentials.
///
/// A stored hash takes precedence; without one the supplied password must
/// equal `default_password`.
///
/// # Errors
///
/// Returns `AuthError::Hash` if the stored hash is malformed.
pub fn check_credentials(
    supplied: &str,
    stored_hash: Option<&str>,
    default_password: &str,
) -> Result<bool> {
    match stored_hash {
        Some(hash) => verify_password(supplied, hash),
        None => Ok(supplied == default_password),
    }
}
