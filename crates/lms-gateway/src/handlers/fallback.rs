//! Answer for requests no route matches.

use axum::http::{Method, Uri};

use lms_service::LmsError;

use crate::error::ApiError;

/// Reject an unmatched method and path with `404 NOT_FOUND`.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    tracing::debug!(method = %method, path = %uri.path(), "No route matched");
    ApiError::Service(LmsError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    })
}
