//! Course result endpoints.

use axum::extract::{Path, RawQuery, State};
use axum::Json;
use lms_auth::JwtValidator;
use lms_core::{Envelope, ResultId};
use lms_service::{ListQuery, Lms, ResultPatch, UpsertResultRequest};
use lms_store::CourseResult;

use super::{created, deleted, ok, ApiResult, AppState, Created};
use crate::auth::AuthUser;
use crate::upload::ApiJson;

/// `GET /api/results?page=&limit=`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a malformed query string.
pub async fn list<L, V>(
    State(state): AppState<L, V>,
    RawQuery(query): RawQuery,
) -> ApiResult<Vec<CourseResult>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let query = ListQuery::parse(query.as_deref().unwrap_or_default())?;
    let (results, pagination) = state.lms.list_results(query.page_request()).await?;
    Ok(Json(Envelope::page(results, pagination)))
}

/// `GET /api/results/student/me`
///
/// # Errors
///
/// Returns `NOT_AUTHENTICATED` without a bearer token.
pub async fn mine<L, V>(State(state): AppState<L, V>, user: AuthUser) -> ApiResult<Vec<CourseResult>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.student_results(&user.caller()).await?)
}

/// `POST /api/results`
///
/// # Errors
///
/// Returns `INVALID_SCORE` for a score outside `[0, 100]`.
pub async fn upsert<L, V>(
    State(state): AppState<L, V>,
    ApiJson(body): ApiJson<UpsertResultRequest>,
) -> Created<CourseResult>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.upsert_result(body).await?)
}

/// `PUT|PATCH /api/results/{id}`
///
/// # Errors
///
/// Returns `RESULT_NOT_FOUND` if the result does not exist.
pub async fn update<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<ResultId>,
    ApiJson(patch): ApiJson<ResultPatch>,
) -> ApiResult<CourseResult>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.update_result(&id, patch).await?)
}

/// `DELETE /api/results/{id}`
///
/// # Errors
///
/// Returns `RESULT_NOT_FOUND` if the result does not exist.
pub async fn delete<L, V>(State(state): AppState<L, V>, Path(id): Path<ResultId>) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.delete_result(&id).await?;
    deleted("Result")
}
