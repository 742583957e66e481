//! In-process dispatcher.
//!
//! Accepts the same method, path and body a client would send over HTTP,
//! resolves it with [`Route::resolve`] and answers with the same envelopes
//! the gateway produces. Useful for embedding the LMS without a socket and
//! for exercising the full request surface in tests.

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use lms_auth::{JwtValidator, TokenIssuer};
use lms_core::Envelope;
use lms_store::Store;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{LmsError, Result};
use crate::router::Route;
use crate::service::{Lms, LmsService, Page};
use crate::types::{Caller, InstructorCourses, ListQuery, StatusChange, Upload};

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// Form fields plus an optional file, as sent with `multipart/form-data`.
    Form(Upload),
}

impl Body {
    fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            Self::Empty => Value::Object(Map::new()),
            Self::Json(value) => value,
            Self::Form(upload) => Value::Object(
                upload
                    .fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ),
        };
        serde_json::from_value(value).map_err(|e| LmsError::validation(e.to_string()))
    }

    fn into_upload(self) -> Result<Upload> {
        match self {
            Self::Empty => Ok(Upload::default()),
            Self::Json(value) => Upload::from_json(value),
            Self::Form(upload) => Ok(upload),
        }
    }
}

/// A request addressed to the dispatcher.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Request method.
    pub method: Method,
    /// Path under `/api`, optionally with a query string.
    pub path: String,
    /// Bearer token, without the `Bearer ` prefix.
    pub token: Option<String>,
    /// Request body.
    pub body: Body,
}

impl ApiRequest {
    /// A request without token or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            token: None,
            body: Body::Empty,
        }
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    /// Attach form fields and a file.
    #[must_use]
    pub fn form(mut self, upload: Upload) -> Self {
        self.body = Body::Form(upload);
        self
    }
}

fn data<T: Serialize>(value: &T) -> Result<Envelope<Value>> {
    Ok(Envelope::data(serde_json::to_value(value)?))
}

fn page<T: Serialize>((items, pagination): Page<T>) -> Result<Envelope<Value>> {
    Ok(Envelope::page(serde_json::to_value(items)?, pagination))
}

fn deleted(entity: &str) -> Envelope<Value> {
    Envelope::message(format!("{entity} deleted successfully"))
}

/// Routes requests to an [`Lms`] implementation.
pub struct Dispatcher<L, V> {
    service: Arc<L>,
    validator: Arc<V>,
    latency: Duration,
}

impl<L: Lms, V: JwtValidator> Dispatcher<L, V> {
    /// Create a dispatcher without simulated latency.
    #[must_use]
    pub fn new(service: Arc<L>, validator: Arc<V>) -> Self {
        Self {
            service,
            validator,
            latency: Duration::ZERO,
        }
    }

    /// Delay every request by `latency` before it is handled.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The wrapped service.
    #[must_use]
    pub fn service(&self) -> &L {
        &self.service
    }

    /// Handle one request.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::RouteNotFound` for an unknown method and path, an
    /// auth error for a token that does not validate, and otherwise whatever
    /// the handler fails with.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<Envelope<Value>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let (route, query) = Route::resolve(&request.method, &request.path)?;
        let caller = match request.token.as_deref() {
            Some(token) => {
                let claims = self.validator.validate(token).await?;
                Some(Caller::new(claims.user_id, claims.role))
            }
            None => None,
        };
        if route.requires_caller() && caller.is_none() {
            return Err(LmsError::NotAuthenticated);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            route = ?route,
            "Dispatching request"
        );

        let result = self.handle(route, query, caller.as_ref(), request.body).await;
        if let Err(e) = &result {
            if e.is_internal() {
                tracing::error!(error = %e, path = %request.path, "Request failed");
            }
        }
        result
    }

    #[allow(clippy::too_many_lines)]
    async fn handle(
        &self,
        route: Route,
        query: ListQuery,
        caller: Option<&Caller>,
        body: Body,
    ) -> Result<Envelope<Value>> {
        let lms = &*self.service;
        let caller = || caller.ok_or(LmsError::NotAuthenticated);
        let page_request = query.page_request();

        match route {
            Route::Login => data(&lms.login(body.decode()?).await?),
            Route::Me => data(&lms.me(caller().ok()).await?),
            Route::SetPassword => {
                lms.set_password(body.decode()?).await?;
                Ok(Envelope::message("Password set successfully"))
            }
            Route::Register => data(&lms.register(body.decode()?).await?),

            Route::DashboardStats => data(&lms.dashboard_stats().await?),
            Route::RecentEnrollments => data(&lms.recent_enrollments().await?),
            Route::CoursePerformance => data(&lms.course_performance().await?),
            Route::DashboardMetrics => data(&lms.dashboard_metrics().await?),
            Route::DashboardCounts => data(&lms.dashboard_counts().await?),

            Route::ListCourses => page(lms.list_courses(page_request).await?),
            Route::AvailableCourses => data(&lms.available_courses().await?),
            Route::InstructorCourses => data(&lms.instructor_courses(caller()?).await?),
            Route::CreateCourse => data(&lms.create_course(caller()?, body.decode()?).await?),
            Route::GetCourse(id) => data(&lms.get_course(&id).await?),
            Route::UpdateCourse(id) => data(&lms.update_course(&id, body.decode()?).await?),
            Route::DeleteCourse(id) => {
                lms.delete_course(&id).await?;
                Ok(deleted("Course"))
            }

            Route::ListUsers => page(lms.list_users(query.role, page_request).await?),
            Route::Students => data(&lms.students().await?),
            Route::CreateUser => data(&lms.create_user(body.decode()?).await?),
            Route::GetUser(id) => data(&lms.get_user(&id).await?),
            Route::UpdateUser(id) => data(&lms.update_user(&id, body.decode()?).await?),
            Route::DeleteUser(id) => {
                lms.delete_user(&id).await?;
                Ok(deleted("User"))
            }
            Route::SetUserStatus(id) => {
                let change: StatusChange = body.decode()?;
                data(&lms.set_user_status(&id, change.is_active).await?)
            }
            Route::AssignInstructorCourses(id) => {
                let courses: InstructorCourses = body.decode()?;
                data(&lms.assign_instructor_courses(&id, courses.course_ids).await?)
            }

            Route::ListEnrollments => page(lms.list_enrollments(page_request).await?),
            Route::CreateEnrollment => {
                data(&lms.create_enrollment(caller()?, body.decode()?).await?)
            }
            Route::StudentEnrollments => data(&lms.student_enrollments(caller()?).await?),
            Route::UpdateEnrollment(id) => {
                data(&lms.update_enrollment(&id, body.decode()?).await?)
            }
            Route::DeleteEnrollment(id) => {
                lms.delete_enrollment(&id).await?;
                Ok(deleted("Enrollment"))
            }

            Route::ListAssignments => data(&lms.list_assignments(query.course.as_ref()).await?),
            Route::EnrolledAssignments => data(&lms.enrolled_assignments(caller()?).await?),
            Route::MySubmissions => data(&lms.my_submissions(caller()?).await?),
            Route::CreateAssignment => {
                data(&lms.create_assignment(caller()?, body.into_upload()?).await?)
            }
            Route::UpdateAssignment(id) => {
                data(&lms.update_assignment(&id, body.decode()?).await?)
            }
            Route::DeleteAssignment(id) => {
                lms.delete_assignment(&id).await?;
                Ok(deleted("Assignment"))
            }
            Route::ListSubmissions(id) => data(&lms.list_submissions(&id).await?),
            Route::CreateSubmission(id) => {
                data(&lms.create_submission(caller()?, &id, body.into_upload()?).await?)
            }
            Route::GradeSubmission(id, sid) => {
                data(&lms.grade_submission(&id, &sid, body.decode()?).await?)
            }
            Route::DeleteSubmission(id, sid) => {
                lms.delete_submission(&id, &sid).await?;
                Ok(deleted("Submission"))
            }

            Route::ListMaterials => data(&lms.list_materials(query.course.as_ref()).await?),
            Route::EnrolledMaterials => data(&lms.enrolled_materials(caller()?).await?),
            Route::CreateMaterial => {
                data(&lms.create_material(caller()?, body.into_upload()?).await?)
            }
            Route::UpdateMaterial(id) => data(&lms.update_material(&id, body.decode()?).await?),
            Route::DeleteMaterial(id) => {
                lms.delete_material(&id).await?;
                Ok(deleted("Material"))
            }

            Route::ListResults => page(lms.list_results(page_request).await?),
            Route::StudentResults => data(&lms.student_results(caller()?).await?),
            Route::UpsertResult => data(&lms.upsert_result(body.decode()?).await?),
            Route::UpdateResult(id) => data(&lms.update_result(&id, body.decode()?).await?),
            Route::DeleteResult(id) => {
                lms.delete_result(&id).await?;
                Ok(deleted("Result"))
            }
        }
    }
}

impl<S, T, V> Dispatcher<LmsService<S, T>, V>
where
    S: Store + 'static,
    T: TokenIssuer + 'static,
    V: JwtValidator,
{
    /// Create a dispatcher that takes its latency from the service config.
    #[must_use]
    pub fn from_service(service: Arc<LmsService<S, T>>, validator: Arc<V>) -> Self {
        let latency = Duration::from_millis(service.config().simulated_latency_ms);
        Self::new(service, validator).with_latency(latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FilePart, ServiceConfig};
    use lms_auth::{AuthConfig, MockJwtValidator};
    use lms_core::Role;
    use lms_store::MemoryStore;
    use serde_json::json;

    type TestDispatcher = Dispatcher<LmsService<MemoryStore, MockJwtValidator>, MockJwtValidator>;

    fn dispatcher_with(config: ServiceConfig) -> TestDispatcher {
        let service = LmsService::new(
            Arc::new(MemoryStore::with_demo_data()),
            Arc::new(MockJwtValidator),
            config,
        );
        Dispatcher::from_service(Arc::new(service), Arc::new(MockJwtValidator))
    }

    fn dispatcher() -> TestDispatcher {
        dispatcher_with(ServiceConfig {
            auth: AuthConfig {
                bcrypt_cost: 4,
                ..AuthConfig::default()
            },
            ..ServiceConfig::default()
        })
    }

    fn token(user: &str, role: Role) -> String {
        MockJwtValidator::token_for(user, role)
    }

    fn payload(envelope: Envelope<Value>) -> Value {
        assert!(envelope.success);
        envelope.data.unwrap()
    }

    #[tokio::test]
    async fn login_returns_token_and_projection_without_password() {
        let d = dispatcher();
        let response = d
            .dispatch(ApiRequest::new(Method::POST, "/api/auth/login").json(json!({
                "email": "student@university.edu",
                "password": "password123",
                "role": "student"
            })))
            .await
            .unwrap();
        let body = payload(response);
        assert!(body["token"].as_str().unwrap().starts_with("test-token:student1"));
        assert_eq!(body["user"]["_id"], "student1");
        assert_eq!(body["user"]["studentId"], "STU001");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());

        let wrong_role = d
            .dispatch(ApiRequest::new(Method::POST, "/api/auth/login").json(json!({
                "email": "student@university.edu",
                "password": "password123",
                "role": "admin"
            })))
            .await;
        assert!(matches!(wrong_role, Err(LmsError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn me_requires_a_token() {
        let d = dispatcher();
        let anonymous = d.dispatch(ApiRequest::new(Method::GET, "/api/auth/me")).await;
        assert!(matches!(anonymous, Err(LmsError::NotAuthenticated)));

        let me = d
            .dispatch(
                ApiRequest::new(Method::GET, "/api/auth/me")
                    .with_token(token("student2", Role::Student)),
            )
            .await
            .unwrap();
        assert_eq!(payload(me)["firstName"], "Jane");

        let bad = d
            .dispatch(ApiRequest::new(Method::GET, "/api/auth/me").with_token("garbage"))
            .await
            .unwrap_err();
        assert_eq!(bad.http_status_code(), 401);
        assert_eq!(bad.kind(), "NOT_AUTHENTICATED");
    }

    #[tokio::test]
    async fn unknown_route_fails_with_method_and_path() {
        let d = dispatcher();
        let err = d
            .dispatch(ApiRequest::new(Method::PATCH, "/api/courses"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "endpoint not found: PATCH /api/courses");
    }

    #[tokio::test]
    async fn caller_scoped_routes_need_a_session() {
        let d = dispatcher();
        let err = d
            .dispatch(ApiRequest::new(Method::GET, "/api/enrollments/student/me"))
            .await
            .unwrap_err();
        assert!(matches!(err, LmsError::NotAuthenticated));
    }

    #[tokio::test]
    async fn full_course_rejects_enrollment_without_side_effects() {
        let d = dispatcher();
        let sarah = token("instructor1", Role::Instructor);
        let created = payload(
            d.dispatch(
                ApiRequest::new(Method::POST, "/api/courses")
                    .with_token(sarah)
                    .json(json!({"title": "Seminar", "code": "SEM1", "capacity": 1})),
            )
            .await
            .unwrap(),
        );
        let course_id = created["_id"].as_str().unwrap().to_string();

        d.dispatch(
            ApiRequest::new(Method::POST, "/api/enrollments")
                .with_token(token("student4", Role::Student))
                .json(json!({ "courseId": course_id })),
        )
        .await
        .unwrap();

        let full = d
            .dispatch(
                ApiRequest::new(Method::POST, "/api/enrollments")
                    .with_token(token("student5", Role::Student))
                    .json(json!({ "courseId": course_id })),
            )
            .await;
        assert!(matches!(full, Err(LmsError::CourseFull)));

        let course = payload(
            d.dispatch(ApiRequest::new(Method::GET, format!("/api/courses/{course_id}")))
                .await
                .unwrap(),
        );
        assert_eq!(course["enrolled"], 1);

        let mine = payload(
            d.dispatch(
                ApiRequest::new(Method::GET, "/api/enrollments/student/me")
                    .with_token(token("student5", Role::Student)),
            )
            .await
            .unwrap(),
        );
        assert_eq!(mine.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn course_crud_round_trip() {
        let d = dispatcher();
        let admin = token("admin1", Role::Admin);
        let created = payload(
            d.dispatch(
                ApiRequest::new(Method::POST, "/api/courses")
                    .with_token(admin.clone())
                    .json(json!({
                        "title": "Compilers",
                        "code": "CS401",
                        "capacity": 20,
                        "instructorId": "instructor2"
                    })),
            )
            .await
            .unwrap(),
        );
        let id = created["_id"].as_str().unwrap().to_string();
        assert_eq!(created["instructor"]["lastName"], "Brown");

        d.dispatch(
            ApiRequest::new(Method::PUT, format!("/api/courses/{id}")).json(json!({"title": "X"})),
        )
        .await
        .unwrap();

        let listed = payload(
            d.dispatch(ApiRequest::new(Method::GET, "/api/courses?limit=100"))
                .await
                .unwrap(),
        );
        let matching: Vec<_> = listed
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["_id"] == id.as_str())
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0]["title"], "X");

        let gone = d
            .dispatch(ApiRequest::new(Method::DELETE, format!("/api/courses/{id}")))
            .await
            .unwrap();
        assert_eq!(gone.message.as_deref(), Some("Course deleted successfully"));

        let listed = payload(
            d.dispatch(ApiRequest::new(Method::GET, "/api/courses"))
                .await
                .unwrap(),
        );
        assert!(listed.as_array().unwrap().iter().all(|c| c["_id"] != id.as_str()));
    }

    #[tokio::test]
    async fn list_users_is_filtered_and_paginated() {
        let d = dispatcher();
        let envelope = d
            .dispatch(ApiRequest::new(Method::GET, "/api/users?role=student&limit=2&page=3"))
            .await
            .unwrap();
        let pagination = envelope.pagination.unwrap();
        assert_eq!(pagination.total, 5);
        assert_eq!(pagination.pages, 3);
        assert_eq!(payload(envelope).as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stats_are_stable_across_reads() {
        let d = dispatcher();
        let first = d
            .dispatch(ApiRequest::new(Method::GET, "/api/dashboard/stats"))
            .await
            .unwrap();
        let second = d
            .dispatch(ApiRequest::new(Method::GET, "/api/dashboard/stats"))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(payload(first)["totalCourses"], 5);
    }

    #[tokio::test]
    async fn form_uploads_reach_material_handler() {
        let d = dispatcher();
        let upload = Upload::default()
            .field("title", "Lecture notes")
            .field("course", "course3")
            .field("fileType", "pdf")
            .with_file(FilePart {
                file_name: "notes.pdf".into(),
                content_type: Some("application/pdf".into()),
                bytes: b"%PDF-1.4".to_vec(),
            });
        let material = payload(
            d.dispatch(
                ApiRequest::new(Method::POST, "/api/materials")
                    .with_token(token("instructor1", Role::Instructor))
                    .form(upload),
            )
            .await
            .unwrap(),
        );
        assert_eq!(material["fileType"], "pdf");
        assert_eq!(material["originalName"], "notes.pdf");
        assert_eq!(material["size"], 8);

        let filtered = payload(
            d.dispatch(ApiRequest::new(Method::GET, "/api/materials?course=course3"))
                .await
                .unwrap(),
        );
        assert_eq!(filtered.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn result_scores_are_validated() {
        let d = dispatcher();
        let err = d
            .dispatch(ApiRequest::new(Method::POST, "/api/results").json(json!({
                "student": "student4",
                "course": "course1",
                "caScore": 120,
                "finalExamScore": 50
            })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INVALID_SCORE");
        assert_eq!(err.http_status_code(), 400);
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let d = dispatcher();
        let err = d
            .dispatch(
                ApiRequest::new(Method::PATCH, "/api/users/student1/status")
                    .json(json!({"isActive": "sometimes"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LmsError::Validation(_)));
    }

    #[tokio::test]
    async fn simulated_latency_delays_responses() {
        let d = dispatcher_with(ServiceConfig {
            simulated_latency_ms: 25,
            ..ServiceConfig::default()
        });
        let started = std::time::Instant::now();
        d.dispatch(ApiRequest::new(Method::GET, "/api/dashboard/counts"))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(25));
    }
}
