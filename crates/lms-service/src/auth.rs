//! Login, registration and session lookup.
//!
//! Accounts without a stored password hash accept the configured default
//! password. That fallback exists for the demo accounts only.

use chrono::Utc;
use lms_auth::{check_credentials, hash_password, AuthConfig, TokenIssuer};
use lms_core::{Role, UserId};
use lms_store::{Store, User};

use crate::error::{LmsError, Result};
use crate::types::{Caller, LoginRequest, LoginResponse, RegisterRequest, SetPasswordRequest, UserProfile};

/// Log a user in.
///
/// The account is looked up by exact email and must hold the requested
/// role. Every successful call issues a fresh token.
///
/// # Errors
///
/// Returns `LmsError::InvalidCredentials` if no active account matches the
/// email and role, or `LmsError::InvalidPassword` if the password is wrong.
pub fn login<S: Store, T: TokenIssuer>(
    store: &S,
    tokens: &T,
    config: &AuthConfig,
    request: &LoginRequest,
) -> Result<LoginResponse> {
    let user = store
        .find_user_by_email(&request.email)?
        .filter(|u| u.role == request.role)
        .ok_or(LmsError::InvalidCredentials)?;

    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Login attempt on deactivated account");
        return Err(LmsError::InvalidCredentials);
    }

    let valid = check_credentials(
        &request.password,
        user.password_hash.as_deref(),
        &config.default_password,
    )?;
    if !valid {
        return Err(LmsError::InvalidPassword);
    }

    let issued = tokens.issue(&user.id, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(LoginResponse {
        token: issued.token,
        user: UserProfile::from(&user),
    })
}

/// Resolve the current session user.
///
/// # Errors
///
/// Returns `LmsError::NotAuthenticated` without a caller, or
/// `LmsError::UserNotFound` if the caller's account no longer exists.
pub fn me<S: Store>(store: &S, caller: Option<&Caller>) -> Result<UserProfile> {
    let caller = caller.ok_or(LmsError::NotAuthenticated)?;
    let user = store
        .get_user(&caller.user_id)?
        .ok_or(LmsError::UserNotFound)?;
    Ok(UserProfile::from(&user))
}

/// Register a new student account.
///
/// # Errors
///
/// Returns `LmsError::Validation` for missing fields or a password that
/// fails the policy, and `LmsError::UserAlreadyExists` if the email is taken.
pub fn register<S: Store>(
    store: &S,
    config: &AuthConfig,
    request: RegisterRequest,
) -> Result<UserProfile> {
    for (name, value) in [
        ("firstName", &request.first_name),
        ("lastName", &request.last_name),
        ("email", &request.email),
        ("password", &request.password),
    ] {
        if value.trim().is_empty() {
            return Err(LmsError::validation(format!("{name} is required")));
        }
    }
    config.password_policy().validate(&request.password)?;

    if store.find_user_by_email(&request.email)?.is_some() {
        return Err(LmsError::UserAlreadyExists);
    }

    let users = store.list_users()?;
    let now = Utc::now();
    let user = User {
        id: UserId::generate(),
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone: request.phone,
        role: Role::Student,
        is_active: true,
        student_id: Some(next_number(&users, Role::Student)),
        instructor_id: None,
        password_hash: Some(hash_password(&request.password, config.bcrypt_cost)?),
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user)?;

    tracing::info!(user_id = %user.id, "Registered student");
    Ok(UserProfile::from(&user))
}

/// Set the password for an account.
///
/// # Errors
///
/// Returns `LmsError::Validation` if the password fails the policy and
/// `LmsError::UserNotFound` if no account has the email.
pub fn set_password<S: Store>(
    store: &S,
    config: &AuthConfig,
    request: &SetPasswordRequest,
) -> Result<()> {
    config.password_policy().validate(&request.password)?;

    let mut user = store
        .find_user_by_email(&request.email)?
        .ok_or(LmsError::UserNotFound)?;
    user.password_hash = Some(hash_password(&request.password, config.bcrypt_cost)?);
    user.updated_at = Utc::now();
    store.put_user(&user)?;

    tracing::info!(user_id = %user.id, "Password set");
    Ok(())
}

/// Next free `STU###` or `INST###` number for the role.
///
/// Starts at the role's head count plus one and skips numbers in use.
/// Admins have no number.
#[must_use]
pub fn next_number(users: &[User], role: Role) -> String {
    let (prefix, taken): (&str, Vec<&str>) = match role {
        Role::Instructor => (
            "INST",
            users.iter().filter_map(|u| u.instructor_id.as_deref()).collect(),
        ),
        Role::Student | Role::Admin => (
            "STU",
            users.iter().filter_map(|u| u.student_id.as_deref()).collect(),
        ),
    };

    let mut n = users.iter().filter(|u| u.role == role).count() + 1;
    loop {
        let candidate = format!("{prefix}{n:03}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}
