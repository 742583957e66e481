//! Authentication extractors.
//!
//! [`AuthUser`] validates the `Authorization: Bearer <token>` header and
//! rejects the request without it. [`MaybeAuthUser`] lets a handler decide
//! for itself what an anonymous request means.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use lms_auth::{JwtValidator, ValidatedClaims};
use lms_core::{Role, UserId};
use lms_service::{Caller, Lms};

use crate::error::ApiError;
use crate::state::GatewayState;

/// An authenticated user extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user the token was issued to.
    pub user_id: UserId,
    /// The role recorded in the token.
    pub role: Role,
}

impl AuthUser {
    /// Create an `AuthUser` from validated claims.
    #[must_use]
    pub fn from_claims(claims: &ValidatedClaims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            role: claims.role,
        }
    }

    /// The session identity handed to the service.
    #[must_use]
    pub fn caller(&self) -> Caller {
        Caller::new(self.user_id.clone(), self.role)
    }
}

/// An optional bearer identity.
///
/// `None` when the request carries no `Authorization` header. A header that
/// is present but does not validate still rejects the request.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

fn bearer_token(parts: &Parts) -> Option<Result<&str, ApiError>> {
    let header = parts.headers.get(AUTHORIZATION)?;
    Some(
        header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized),
    )
}

async fn authenticate<V: JwtValidator>(validator: &V, token: &str) -> Result<AuthUser, ApiError> {
    let claims = validator.validate(token).await?;
    tracing::debug!(user_id = %claims.user_id, role = %claims.role, "Authenticated request");
    Ok(AuthUser::from_claims(&claims))
}

impl<L, V> FromRequestParts<Arc<GatewayState<L, V>>> for AuthUser
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<L, V>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)??;
        authenticate(&*state.jwt_validator, token).await
    }
}

impl<L, V> FromRequestParts<Arc<GatewayState<L, V>>> for MaybeAuthUser
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<L, V>>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(Self(None)),
            Some(token) => Ok(Self(Some(authenticate(&*state.jwt_validator, token?).await?))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::{Duration, Utc};

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn auth_user_from_claims() {
        let claims = ValidatedClaims {
            user_id: UserId::new("student1").unwrap(),
            role: Role::Student,
            token_id: "jti".into(),
            expires_at: Utc::now() + Duration::hours(1),
        };

        let user = AuthUser::from_claims(&claims);
        assert_eq!(user.user_id.as_str(), "student1");
        assert_eq!(user.caller().role, Role::Student);
    }

    #[test]
    fn bearer_header_parsing() {
        assert!(bearer_token(&parts_with(None)).is_none());
        assert_eq!(
            bearer_token(&parts_with(Some("Bearer abc"))).unwrap().unwrap(),
            "abc"
        );
        assert!(matches!(
            bearer_token(&parts_with(Some("Basic abc"))),
            Some(Err(ApiError::Unauthorized))
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Bearer "))),
            Some(Err(ApiError::Unauthorized))
        ));
    }
}
