//! Dashboard aggregation endpoints. Every call recomputes from the store.

use axum::extract::State;
use lms_auth::JwtValidator;
use lms_service::dashboard::{
    CoursePerformance, DashboardCounts, DashboardMetrics, DashboardStats, RecentEnrollment,
};
use lms_service::Lms;

use super::{ok, ApiResult, AppState};

/// `GET /api/dashboard/stats`
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn stats<L, V>(State(state): AppState<L, V>) -> ApiResult<DashboardStats>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.dashboard_stats().await?)
}

/// `GET /api/dashboard/recent-enrollments`
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn recent_enrollments<L, V>(State(state): AppState<L, V>) -> ApiResult<Vec<RecentEnrollment>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.recent_enrollments().await?)
}

/// `GET /api/dashboard/course-performance`
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn course_performance<L, V>(
    State(state): AppState<L, V>,
) -> ApiResult<Vec<CoursePerformance>>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.course_performance().await?)
}

/// `GET /api/dashboard/metrics`
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn metrics<L, V>(State(state): AppState<L, V>) -> ApiResult<DashboardMetrics>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.dashboard_metrics().await?)
}

/// `GET /api/dashboard/counts`
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn counts<L, V>(State(state): AppState<L, V>) -> ApiResult<DashboardCounts>
where
    L: Lms + 'static,
    V: JwtValidator + 'static,
{
    ok(state.lms.dashboard_counts().await?)
}
