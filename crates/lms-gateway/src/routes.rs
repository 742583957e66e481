//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use lms_auth::JwtValidator;
use lms_service::Lms;

use crate::handlers::{
    assignments, auth, courses, dashboard, enrollments, fallback, health, materials, results,
    users,
};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health`
///
/// ## Auth
/// - `POST /api/auth/login`, `GET /api/auth/me`
/// - `POST /api/auth/register`, `POST /api/auth/set-password`
///
/// ## Dashboard
/// - `GET /api/dashboard/{stats,recent-enrollments,course-performance,metrics,counts}`
///
/// ## Resources
/// - `/api/courses` (+ `/available`, `/instructor`, `/{id}`)
/// - `/api/users` (+ `/students`, `/{id}`, `/{id}/status`, `/{id}/instructor-courses`)
/// - `/api/enrollments` (+ `/student/me`, `/{id}`)
/// - `/api/assignments` (+ `/enrolled`, `/submissions`, `/{id}`,
///   `/{id}/submissions`, `/{id}/submissions/{sid}`)
/// - `/api/materials` (+ `/enrolled`, `/{id}`)
/// - `/api/results` (+ `/student/me`, `/{id}`)
///
/// Updates accept both `PUT` and `PATCH`. Anything else answers `404` with
/// `endpoint not found: METHOD /path`.
pub fn create_router<L, V>(state: GatewayState<L, V>) -> Router
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();
    let latency = state.config.simulated_latency();

    let mut api = api_routes::<L, V>();
    if !latency.is_zero() {
        api = api.layer(middleware::from_fn_with_state(latency, simulate_latency));
    }

    Router::new()
        .route("/health", get(health::health::<L, V>))
        .merge(api)
        .fallback(fallback::not_found)
        .method_not_allowed_fallback(fallback::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(Arc::new(state))
}

#[allow(clippy::too_many_lines)]
fn api_routes<L, V>() -> Router<Arc<GatewayState<L, V>>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    Router::new()
        // Auth
        .route("/api/auth/login", post(auth::login::<L, V>))
        .route("/api/auth/me", get(auth::me::<L, V>))
        .route("/api/auth/register", post(auth::register::<L, V>))
        .route("/api/auth/set-password", post(auth::set_password::<L, V>))
        // Dashboard
        .route("/api/dashboard/stats", get(dashboard::stats::<L, V>))
        .route(
            "/api/dashboard/recent-enrollments",
            get(dashboard::recent_enrollments::<L, V>),
        )
        .route(
            "/api/dashboard/course-performance",
            get(dashboard::course_performance::<L, V>),
        )
        .route("/api/dashboard/metrics", get(dashboard::metrics::<L, V>))
        .route("/api/dashboard/counts", get(dashboard::counts::<L, V>))
        // Courses
        .route(
            "/api/courses",
            get(courses::list::<L, V>).post(courses::create::<L, V>),
        )
        .route("/api/courses/available", get(courses::available::<L, V>))
        .route("/api/courses/instructor", get(courses::instructor::<L, V>))
        .route(
            "/api/courses/{id}",
            get(courses::get::<L, V>)
                .put(courses::update::<L, V>)
                .patch(courses::update::<L, V>)
                .delete(courses::delete::<L, V>),
        )
        // Users
        .route(
            "/api/users",
            get(users::list::<L, V>).post(users::create::<L, V>),
        )
        .route("/api/users/students", get(users::students::<L, V>))
        .route(
            "/api/users/{id}",
            get(users::get::<L, V>)
                .put(users::update::<L, V>)
                .patch(users::update::<L, V>)
                .delete(users::delete::<L, V>),
        )
        .route(
            "/api/users/{id}/status",
            patch(users::set_status::<L, V>),
        )
        .route(
            "/api/users/{id}/instructor-courses",
            put(users::assign_courses::<L, V>)
                .patch(users::assign_courses::<L, V>),
        )
        // Enrollments
        .route(
            "/api/enrollments",
            get(enrollments::list::<L, V>).post(enrollments::create::<L, V>),
        )
        .route("/api/enrollments/student/me", get(enrollments::mine::<L, V>))
        .route(
            "/api/enrollments/{id}",
            put(enrollments::update::<L, V>)
                .patch(enrollments::update::<L, V>)
                .delete(enrollments::delete::<L, V>),
        )
        // Assignments and submissions
        .route(
            "/api/assignments",
            get(assignments::list::<L, V>).post(assignments::create::<L, V>),
        )
        .route("/api/assignments/enrolled", get(assignments::enrolled::<L, V>))
        .route(
            "/api/assignments/submissions",
            get(assignments::my_submissions::<L, V>),
        )
        .route(
            "/api/assignments/{id}",
            put(assignments::update::<L, V>)
                .patch(assignments::update::<L, V>)
                .delete(assignments::delete::<L, V>),
        )
        .route(
            "/api/assignments/{id}/submissions",
            get(assignments::list_submissions::<L, V>).post(assignments::submit::<L, V>),
        )
        .route(
            "/api/assignments/{id}/submissions/{sid}",
            put(assignments::grade::<L, V>)
                .patch(assignments::grade::<L, V>)
                .delete(assignments::delete_submission::<L, V>),
        )
        // Materials
        .route(
            "/api/materials",
            get(materials::list::<L, V>).post(materials::create::<L, V>),
        )
        .route("/api/materials/enrolled", get(materials::enrolled::<L, V>))
        .route(
            "/api/materials/{id}",
            put(materials::update::<L, V>)
                .patch(materials::update::<L, V>)
                .delete(materials::delete::<L, V>),
        )
        // Results
        .route(
            "/api/results",
            get(results::list::<L, V>).post(results::upsert::<L, V>),
        )
        .route("/api/results/student/me", get(results::mine::<L, V>))
        .route(
            "/api/results/{id}",
            put(results::update::<L, V>)
                .patch(results::update::<L, V>)
                .delete(results::delete::<L, V>),
        )
}

/// Delay every API request, standing in for network latency in demos.
async fn simulate_latency(State(latency): State<Duration>, request: Request, next: Next) -> Response {
    tokio::time::sleep(latency).await;
    next.run(request).await
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
