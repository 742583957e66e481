//! Enrollment endpoints.

use axum::extract::{Path, RawQuery, State};
use axum::Json;
use lms_auth::JwtValidator;
use lms_core::{EnrollmentId, Envelope};
use lms_service::{CreateEnrollmentRequest, EnrollmentPatch, ListQuery, Lms};
use lms_store::Enrollment;

use super::{created, deleted, ok, ApiResult, AppState, Created};
use crate::auth::AuthUser;
use crate::upload::ApiJson;

/// `GET /api/enrollments?page=&limit=`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a malformed query string.
pub async fn list<L, V>(
    State(state): AppState<L, V>,
    RawQuery(query): RawQuery,
) -> ApiResult<Vec<Enrollment>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let query = ListQuery::parse(query.as_deref().unwrap_or_default())?;
    let (enrollments, pagination) = state.lms.list_enrollments(query.page_request()).await?;
    Ok(Json(Envelope::page(enrollments, pagination)))
}

/// `POST /api/enrollments`
///
/// # Errors
///
/// Returns `COURSE_NOT_FOUND`, `ALREADY_ENROLLED` or `COURSE_FULL`, checked
/// in that order.
pub async fn create<L, V>(
    State(state): AppState<L, V>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateEnrollmentRequest>,
) -> Created<Enrollment>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.create_enrollment(&user.caller(), body).await?)
}

/// `GET /api/enrollments/student/me`
///
/// # Errors
///
/// Returns `NOT_AUTHENTICATED` without a bearer token.
pub async fn mine<L, V>(State(state): AppState<L, V>, user: AuthUser) -> ApiResult<Vec<Enrollment>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.student_enrollments(&user.caller()).await?)
}

/// `PUT|PATCH /api/enrollments/{id}`
///
/// # Errors
///
/// Returns `ENROLLMENT_NOT_FOUND` if the enrollment does not exist.
pub async fn update<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<EnrollmentId>,
    ApiJson(patch): ApiJson<EnrollmentPatch>,
) -> ApiResult<Enrollment>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.update_enrollment(&id, patch).await?)
}

/// `DELETE /api/enrollments/{id}`
///
/// # Errors
///
/// Returns `ENROLLMENT_NOT_FOUND` if the enrollment does not exist.
pub async fn delete<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<EnrollmentId>,
) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.delete_enrollment(&id).await?;
    deleted("Enrollment")
}
