//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token has expired.
    #[error("token expired")]
    TokenExpired,

    /// The token signature is invalid.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token issuer does not match the expected value.
    #[error("invalid issuer")]
    InvalidIssuer,

    /// The user ID in the token is malformed.
    #[error("invalid user ID format")]
    InvalidUserId,

    /// The role in the token is not a known role.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// The token format is invalid.
    #[error("invalid token format: {0}")]
    InvalidToken(String),

    /// The password does not satisfy the password policy.
    #[error("password must be at least {min_length} characters long")]
    PasswordTooShort {
        /// Minimum accepted length.
        min_length: usize,
    },

    /// Hashing or verifying a password failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Signing a token failed.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// Returns `true` if this error indicates the client should log in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired
                | Self::InvalidSignature
                | Self::InvalidIssuer
                | Self::InvalidUserId
                | Self::InvalidRole(_)
                | Self::InvalidToken(_)
        )
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::TokenExpired
            | Self::InvalidSignature
            | Self::InvalidIssuer
            | Self::InvalidUserId
            | Self::InvalidRole(_)
            | Self::InvalidToken(_) => 401,
            Self::PasswordTooShort { .. } => 400,
            Self::Hash(_) | Self::Signing(_) => 500,
        }
    }
}
