//! Assignment and submission endpoints.
//!
//! Creating an assignment or a submission accepts `multipart/form-data`
//! with an optional `file` part, or a plain JSON object.

use axum::extract::{Path, RawQuery, State};
use lms_auth::JwtValidator;
use lms_core::{AssignmentId, SubmissionId};
use lms_service::{AssignmentPatch, ListQuery, Lms, SubmissionGrade};
use lms_store::{Assignment, Submission};

use super::{created, deleted, ok, ApiResult, AppState, Created};
use crate::auth::AuthUser;
use crate::upload::{ApiJson, FormUpload};

/// `GET /api/assignments?course=`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a malformed query string.
pub async fn list<L, V>(
    State(state): AppState<L, V>,
    RawQuery(query): RawQuery,
) -> ApiResult<Vec<Assignment>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let query = ListQuery::parse(query.as_deref().unwrap_or_default())?;
    ok(state.lms.list_assignments(query.course.as_ref()).await?)
}

/// `GET /api/assignments/enrolled`
///
/// # Errors
///
/// Returns `NOT_AUTHENTICATED` without a bearer token.
pub async fn enrolled<L, V>(State(state): AppState<L, V>, user: AuthUser) -> ApiResult<Vec<Assignment>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.enrolled_assignments(&user.caller()).await?)
}

/// `POST /api/assignments`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a missing title, course or due date and
/// `COURSE_NOT_FOUND` for an unknown course.
pub async fn create<L, V>(
    State(state): AppState<L, V>,
    user: AuthUser,
    FormUpload(upload): FormUpload,
) -> Created<Assignment>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.create_assignment(&user.caller(), upload).await?)
}

/// `PUT|PATCH /api/assignments/{id}`
///
/// # Errors
///
/// Returns `ASSIGNMENT_NOT_FOUND` if the assignment does not exist.
pub async fn update<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<AssignmentId>,
    ApiJson(patch): ApiJson<AssignmentPatch>,
) -> ApiResult<Assignment>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.update_assignment(&id, patch).await?)
}

/// `DELETE /api/assignments/{id}`
///
/// # Errors
///
/// Returns `ASSIGNMENT_NOT_FOUND` if the assignment does not exist.
pub async fn delete<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<AssignmentId>,
) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.delete_assignment(&id).await?;
    deleted("Assignment")
}

/// `GET /api/assignments/submissions`
///
/// # Errors
///
/// Returns `NOT_AUTHENTICATED` without a bearer token.
pub async fn my_submissions<L, V>(
    State(state): AppState<L, V>,
    user: AuthUser,
) -> ApiResult<Vec<Submission>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.my_submissions(&user.caller()).await?)
}

/// `GET /api/assignments/{id}/submissions`
///
/// # Errors
///
/// Returns `ASSIGNMENT_NOT_FOUND` if the assignment does not exist.
pub async fn list_submissions<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<AssignmentId>,
) -> ApiResult<Vec<Submission>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.list_submissions(&id).await?)
}

/// `POST /api/assignments/{id}/submissions`
///
/// # Errors
///
/// Returns `ASSIGNMENT_NOT_FOUND` for an unknown assignment and
/// `VALIDATION_ERROR` when no file is attached.
pub async fn submit<L, V>(
    State(state): AppState<L, V>,
    user: AuthUser,
    Path(id): Path<AssignmentId>,
    FormUpload(upload): FormUpload,
) -> Created<Submission>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.create_submission(&user.caller(), &id, upload).await?)
}

/// `PUT|PATCH /api/assignments/{id}/submissions/{sid}`
///
/// # Errors
///
/// Returns `SUBMISSION_NOT_FOUND` unless the submission belongs to the
/// assignment.
pub async fn grade<L, V>(
    State(state): AppState<L, V>,
    Path((id, sid)): Path<(AssignmentId, SubmissionId)>,
    ApiJson(body): ApiJson<SubmissionGrade>,
) -> ApiResult<Submission>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.grade_submission(&id, &sid, body).await?)
}

/// `DELETE /api/assignments/{id}/submissions/{sid}`
///
/// # Errors
///
/// Returns `SUBMISSION_NOT_FOUND` unless the submission belongs to the
/// assignment.
pub async fn delete_submission<L, V>(
    State(state): AppState<L, V>,
    Path((id, sid)): Path<(AssignmentId, SubmissionId)>,
) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.delete_submission(&id, &sid).await?;
    deleted("Submission")
}
