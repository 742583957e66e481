//! Login, session and account endpoints.

use axum::extract::State;
use axum::Json;
use lms_auth::JwtValidator;
use lms_core::Envelope;
use lms_service::{Lms, LoginRequest, LoginResponse, RegisterRequest, SetPasswordRequest, UserProfile};

use super::{created, ok, ApiResult, AppState, Created};
use crate::auth::MaybeAuthUser;
use crate::upload::ApiJson;

/// `POST /api/auth/login`
///
/// # Errors
///
/// Returns `INVALID_CREDENTIALS` if no user matches the email and role, and
/// `INVALID_PASSWORD` if the password is wrong.
pub async fn login<L, V>(
    State(state): AppState<L, V>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.login(body).await?)
}

/// `GET /api/auth/me`
///
/// # Errors
///
/// Returns `NOT_AUTHENTICATED` without a bearer token and `USER_NOT_FOUND`
/// if the token's user no longer exists.
pub async fn me<L, V>(
    State(state): AppState<L, V>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> ApiResult<UserProfile>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let caller = user.map(|u| u.caller());
    ok(state.lms.me(caller.as_ref()).await?)
}

/// `POST /api/auth/register`
///
/// # Errors
///
/// Returns `USER_ALREADY_EXISTS` for a known email and `VALIDATION_ERROR` for
/// missing fields or a short password.
pub async fn register<L, V>(
    State(state): AppState<L, V>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Created<UserProfile>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.register(body).await?)
}

/// `POST /api/auth/set-password`
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` for an unknown email and `VALIDATION_ERROR` for
/// a password that fails the policy.
pub async fn set_password<L, V>(
    State(state): AppState<L, V>,
    ApiJson(body): ApiJson<SetPasswordRequest>,
) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.set_password(body).await?;
    Ok(Json(Envelope::message("Password set successfully")))
}
