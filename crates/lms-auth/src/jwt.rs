//! Bearer token issue and validation.
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`), the role and a fresh
//! `jti`, so two logins by the same user never produce the same token.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use lms_core::{Role, UserId};

use crate::error::{AuthError, Result};
use crate::AuthConfig;

/// Validated claims extracted from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedClaims {
    /// The user the token was issued to.
    pub user_id: UserId,
    /// The user's role at login time.
    pub role: Role,
    /// Unique token id (`jti`).
    pub token_id: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The encoded token.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Trait for issuing bearer tokens on login.
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be signed.
    fn issue(&self, user_id: &UserId, role: Role) -> Result<IssuedToken>;
}

/// Trait for validating bearer tokens.
#[async_trait]
pub trait JwtValidator: Send + Sync {
    /// Validate a token and extract claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, expired, or cannot be validated.
    async fn validate(&self, token: &str) -> Result<ValidatedClaims>;
}

/// Claims as encoded in the token.
#[derive(Debug, Serialize, Deserialize)]
struct RawClaims {
    sub: String,
    role: String,
    iss: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// HMAC-SHA256 token service.
///
/// Issues and validates tokens with a shared secret.
pub struct HmacTokens {
    config: AuthConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl HmacTokens {
    /// Create a token service from configuration.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.token_secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.token_secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
        }
    }

    fn ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.config.token_ttl_seconds).unwrap_or(i64::MAX / 1000))
    }
}

impl TokenIssuer for HmacTokens {
    fn issue(&self, user_id: &UserId, role: Role) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.ttl();

        let claims = RawClaims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        tracing::debug!(user_id = %user_id, role = %role, "Issued token");

        Ok(IssuedToken { token, expires_at })
    }
}

#[async_trait]
impl JwtValidator for HmacTokens {
    async fn validate(&self, token: &str) -> Result<ValidatedClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.validate_aud = false;
        validation.validate_exp = true;

        let token_data =
            decode::<RawClaims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let claims = token_data.claims;

        let user_id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidUserId)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidRole(claims.role.clone()))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken("invalid exp timestamp".to_string()))?;

        Ok(ValidatedClaims {
            user_id,
            role,
            token_id: claims.jti,
            expires_at,
        })
    }
}

/// A mock token service for testing.
///
/// Issues and accepts tokens of the form `test-token:<user_id>:<role>`,
/// optionally followed by `:<nonce>`.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct MockJwtValidator;

#[cfg(any(test, feature = "test-utils"))]
impl MockJwtValidator {
    /// Build a token the mock validator accepts.
    #[must_use]
    pub fn token_for(user_id: &str, role: Role) -> String {
        format!("test-token:{user_id}:{role}")
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl TokenIssuer for MockJwtValidator {
    fn issue(&self, user_id: &UserId, role: Role) -> Result<IssuedToken> {
        let nonce = uuid::Uuid::new_v4().simple();
        Ok(IssuedToken {
            token: format!("{}:{nonce}", Self::token_for(user_id.as_str(), role)),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl JwtValidator for MockJwtValidator {
    async fn validate(&self, token: &str) -> Result<ValidatedClaims> {
        const EXPECTED: &str = "expected test-token:<user_id>:<role>[:<nonce>]";

        let rest = token
            .strip_prefix("test-token:")
            .ok_or_else(|| AuthError::InvalidToken(EXPECTED.to_string()))?;

        let parts: Vec<&str> = rest.split(':').collect();
        let (user, role, nonce) = match parts.as_slice() {
            [user, role] => (*user, *role, ""),
            [user, role, nonce] => (*user, *role, *nonce),
            _ => return Err(AuthError::InvalidToken(EXPECTED.to_string())),
        };

        let user_id = UserId::new(user).map_err(|_| AuthError::InvalidUserId)?;
        let role = role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidRole(role.to_string()))?;

        Ok(ValidatedClaims {
            user_id,
            role,
            token_id: nonce.to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}
