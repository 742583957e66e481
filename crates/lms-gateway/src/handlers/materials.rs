//! Course material endpoints.

use axum::extract::{Path, RawQuery, State};
use lms_auth::JwtValidator;
use lms_core::MaterialId;
use lms_service::{ListQuery, Lms, MaterialPatch};
use lms_store::Material;

use super::{created, deleted, ok, ApiResult, AppState, Created};
use crate::auth::AuthUser;
use crate::upload::{ApiJson, FormUpload};

/// `GET /api/materials?course=`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a malformed query string.
pub async fn list<L, V>(
    State(state): AppState<L, V>,
    RawQuery(query): RawQuery,
) -> ApiResult<Vec<Material>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    let query = ListQuery::parse(query.as_deref().unwrap_or_default())?;
    ok(state.lms.list_materials(query.course.as_ref()).await?)
}

/// `GET /api/materials/enrolled`
///
/// # Errors
///
/// Returns `NOT_AUTHENTICATED` without a bearer token.
pub async fn enrolled<L, V>(State(state): AppState<L, V>, user: AuthUser) -> ApiResult<Vec<Material>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.enrolled_materials(&user.caller()).await?)
}

/// `POST /api/materials`
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for a missing title, course or file.
pub async fn create<L, V>(
    State(state): AppState<L, V>,
    user: AuthUser,
    FormUpload(upload): FormUpload,
) -> Created<Material>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    created(state.lms.create_material(&user.caller(), upload).await?)
}

/// `PUT|PATCH /api/materials/{id}`
///
/// # Errors
///
/// Returns `MATERIAL_NOT_FOUND` if the material does not exist.
pub async fn update<L, V>(
    State(state): AppState<L, V>,
    Path(id): Path<MaterialId>,
    ApiJson(patch): ApiJson<MaterialPatch>,
) -> ApiResult<Material>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.update_material(&id, patch).await?)
}

/// `DELETE /api/materials/{id}`
///
/// # Errors
///
/// Returns `MATERIAL_NOT_FOUND` if the material does not exist.
pub async fn delete<L, V>(State(state): AppState<L, V>, Path(id): Path<MaterialId>) -> ApiResult<()>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    state.lms.delete_material(&id).await?;
    deleted("Material")
}
