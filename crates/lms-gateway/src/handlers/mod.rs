//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API. Each
//! handler unwraps its extractors, calls one [`lms_service::Lms`] operation
//! and wraps the result in an [`Envelope`].

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use lms_core::Envelope;

use crate::error::ApiError;
use crate::state::GatewayState;

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod fallback;
pub mod health;
pub mod materials;
pub mod results;
pub mod users;

/// State extractor shared by every handler.
pub type AppState<L, V> = State<Arc<GatewayState<L, V>>>;

/// A `200 OK` envelope.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// A `201 Created` envelope.
pub type Created<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::data(data)))
}

fn created<T>(data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(Envelope::data(data))))
}

fn deleted(entity: &str) -> ApiResult<()> {
    Ok(Json(Envelope::message(format!("{entity} deleted successfully"))))
}
