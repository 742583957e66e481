//! User administration endpoints.

use axum::extract::{Path, RawQuery, State};
use axum::Json;
use lms_auth::JwtValidator;
use lms_core::{Envelope, UserId};
use lms_service::{CreateUserRequest, InstructorCourses, ListQuery, Lms, StatusChange, UserPatch};
use lms_store::{Course, User};

use super::{created, deleted, ok, ApiResult, AppState, Created};
use crate::upload::ApiJson;

/// `GET /api/users?role=&page=&limit=`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a malformed query string.
pub async fn list<L, V>(
    State(state): AppState<L, V>,
    RawQuery(query): RawQuery,
) -> ApiResult<Vec<User>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let query = ListQuery::parse(query.as_deref().unwrap_or_default())?;
    let (users, pagination) = state
        .lms
        .list_users(query.role, query.page_request())
        .await?;
    Ok(Json(Envelope::page(users, pagination)))
}

/// `GET /api/users/students`
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn students<L, V>(State(state): AppState<L, V>) -> ApiResult<Vec<User>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.students().await?)
}

/// `GET /api/users/{id}`
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` if the user does not exist.
pub async fn get<L, V>(State(state): AppState<L, V>, Path(id): Path<UserId>) -> ApiResult<User>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.get_user(&id).await?)
}

/// `POST /api/users`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for missing names or email.
pub async fn create<L, V>(
    State(state): AppState<L, V>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Created<User>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.create_user(body).await?)
}

/// `PUT|PATCH /api/users/{id}`
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` if the user does not exist.
pub async fn update<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<UserId>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<User>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.update_user(&id, patch).await?)
}

/// `DELETE /api/users/{id}`
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` if the user does not exist.
pub async fn delete<L, V>(State(state): AppState<L, V>, Path(id): Path<UserId>) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.delete_user(&id).await?;
    deleted("User")
}

/// `PATCH /api/users/{id}/status`
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` if the user does not exist.
pub async fn set_status<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<UserId>,
    ApiJson(body): ApiJson<StatusChange>,
) -> ApiResult<User>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.set_user_status(&id, body.is_active).await?)
}

/// `PUT|PATCH /api/users/{id}/instructor-courses`
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` or `COURSE_NOT_FOUND` for unknown ids and
/// `VALIDATION_ERROR` if the user is not an instructor.
pub async fn assign_courses<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<UserId>,
    ApiJson(body): ApiJson<InstructorCourses>,
) -> ApiResult<Vec<Course>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state
        .lms
        .assign_instructor_courses(&id, body.course_ids)
        .await?)
}
