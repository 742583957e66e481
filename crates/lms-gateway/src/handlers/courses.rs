//! Course endpoints.

use axum::extract::{Path, RawQuery, State};
use axum::Json;
use lms_auth::JwtValidator;
use lms_core::{CourseId, Envelope};
use lms_service::{CoursePatch, CreateCourseRequest, ListQuery, Lms};
use lms_store::Course;

use super::{created, deleted, ok, ApiResult, AppState, Created};
use crate::auth::AuthUser;
use crate::upload::ApiJson;

/// `GET /api/courses?page=&limit=`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a malformed query string.
pub async fn list<L, V>(
    State(state): AppState<L, V>,
    RawQuery(query): RawQuery,
) -> ApiResult<Vec<Course>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let query = ListQuery::parse(query.as_deref().unwrap_or_default())?;
    let (courses, pagination) = state.lms.list_courses(query.page_request()).await?;
    Ok(Json(Envelope::page(courses, pagination)))
}

/// `GET /api/courses/available`
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn available<L, V>(State(state): AppState<L, V>) -> ApiResult<Vec<Course>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.available_courses().await?)
}

/// `GET /api/courses/instructor`
///
/// # Errors
///
/// Returns `NOT_AUTHENTICATED` without a bearer token.
pub async fn instructor<L, V>(State(state): AppState<L, V>, user: AuthUser) -> ApiResult<Vec<Course>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.instructor_courses(&user.caller()).await?)
}

/// `GET /api/courses/{id}`
///
/// # Errors
///
/// Returns `COURSE_NOT_FOUND` if the course does not exist.
pub async fn get<L, V>(State(state): AppState<L, V>, Path(id): Path<CourseId>) -> ApiResult<Course>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.get_course(&id).await?)
}

/// `POST /api/courses`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a missing title, code or instructor.
pub async fn create<L, V>(
    State(state): AppState<L, V>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateCourseRequest>,
) -> Created<Course>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.create_course(&user.caller(), body).await?)
}

/// `PUT|PATCH /api/courses/{id}`
///
/// # Errors
///
/// Returns `COURSE_NOT_FOUND` if the course does not exist.
pub async fn update<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<CourseId>,
    ApiJson(patch): ApiJson<CoursePatch>,
) -> ApiResult<Course>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.update_course(&id, patch).await?)
}

/// `DELETE /api/courses/{id}`
///
/// # Errors
///
/// Returns `COURSE_NOT_FOUND` if the course does not exist.
pub async fn delete<L, V>(State(state): AppState<L, V>, Path(id): Path<CourseId>) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.delete_course(&id).await?;
    deleted("Course")
}
