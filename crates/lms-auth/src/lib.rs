//! Authentication for the LMS.
//!
//! This crate provides:
//!
//! - Bearer token issue and validation (HS256 JWT)
//! - Password policy, bcrypt hashing and login credential checks
//! - A mock token service for tests (feature `test-utils`)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Gateway /      │────▶│   JwtValidator   │
//! │   Dispatcher     │     │   (trait)        │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//! ┌──────────────────┐     ┌────────▼─────────┐
//! │   LmsService     │────▶│   HmacTokens     │
//! │   (login)        │     │   TokenIssuer    │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use lms_auth::{AuthConfig, HmacTokens, JwtValidator, TokenIssuer};
//! use lms_core::{Role, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = HmacTokens::new(AuthConfig::default());
//!
//! let issued = tokens.issue(&UserId::new("student1")?, Role::Student)?;
//! let claims = tokens.validate(&issued.token).await?;
//! assert_eq!(claims.role, Role::Student);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod jwt;
pub mod password;

pub use error::{AuthError, Result};
pub use jwt::{HmacTokens, IssuedToken, JwtValidator, TokenIssuer, ValidatedClaims};
pub use password::{
    check_credentials, hash_password, verify_password, PasswordPolicy,
    DEFAULT_MIN_PASSWORD_LENGTH,
};

#[cfg(any(test, feature = "test-utils"))]
pub use jwt::MockJwtValidator;

use serde::Deserialize;

/// Configuration for token issue and credential checks.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens.
    #[serde(default = "AuthConfig::default_secret")]
    pub token_secret: String,
    /// Value of the `iss` claim.
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
    /// Token lifetime in seconds.
    #[serde(default = "AuthConfig::default_ttl")]
    pub token_ttl_seconds: u64,
    /// Password accepted for accounts without a stored hash.
    #[serde(default = "AuthConfig::default_password")]
    pub default_password: String,
    /// Minimum password length for registration and password changes.
    #[serde(default = "AuthConfig::default_min_length")]
    pub min_password_length: usize,
    /// bcrypt work factor.
    #[serde(default = "AuthConfig::default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    fn default_secret() -> String {
        "lms-development-secret".to_string()
    }

    fn default_issuer() -> String {
        "lms-gateway".to_string()
    }

    const fn default_ttl() -> u64 {
        // 24 hours
        86_400
    }

    fn default_password() -> String {
        "password123".to_string()
    }

    const fn default_min_length() -> usize {
        DEFAULT_MIN_PASSWORD_LENGTH
    }

    const fn default_bcrypt_cost() -> u32 {
        bcrypt::DEFAULT_COST
    }

    /// The password policy derived from this configuration.
    #[must_use]
    pub const fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.min_password_length,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: Self::default_secret(),
            issuer: Self::default_issuer(),
            token_ttl_seconds: Self::default_ttl(),
            default_password: Self::default_password(),
            min_password_length: Self::default_min_length(),
            bcrypt_cost: Self::default_bcrypt_cost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "lms-gateway");
        assert_eq!(config.token_ttl_seconds, 86_400);
        assert_eq!(config.min_password_length, 6);
        assert_eq!(config.password_policy().min_length, 6);
    }

    #[test]
    fn auth_error_status_codes() {
        assert_eq!(AuthError::TokenExpired.http_status_code(), 401);
        assert_eq!(AuthError::InvalidSignature.http_status_code(), 401);
        assert_eq!(
            AuthError::PasswordTooShort { min_length: 6 }.http_status_code(),
            400
        );
        assert_eq!(AuthError::Hash("boom".into()).http_status_code(), 500);
    }

    #[test]
    fn auth_error_requires_login() {
        assert!(AuthError::TokenExpired.requires_login());
        assert!(AuthError::InvalidToken("x".into()).requires_login());
        assert!(!AuthError::Hash("x".into()).requires_login());
    }
}
