//! LMS service implementation.
//!
//! This module provides the `Lms` trait and the `LmsService` implementation
//! that wires the per-entity handlers to a store and a token issuer.

use std::sync::Arc;

use async_trait::async_trait;
use lms_auth::TokenIssuer;
use lms_core::{
    AssignmentId, CourseId, EnrollmentId, MaterialId, PageRequest, Pagination, ResultId, Role,
    SubmissionId, UserId,
};
use lms_store::{Assignment, Course, CourseResult, Enrollment, Material, Store, Submission, User};

use crate::dashboard::{
    self, CoursePerformance, DashboardCounts, DashboardMetrics, DashboardStats, RecentEnrollment,
};
use crate::error::Result;
use crate::types::{
    AssignmentPatch, Caller, CoursePatch, CreateCourseRequest, CreateEnrollmentRequest,
    CreateUserRequest, EnrollmentPatch, LoginRequest, LoginResponse, MaterialPatch,
    RegisterRequest, ResultPatch, ServiceConfig, SetPasswordRequest, SubmissionGrade, Upload,
    UpsertResultRequest, UserPatch, UserProfile,
};
use crate::{assignments, auth, courses, enrollments, materials, results, users};

/// One page of records plus the page description.
pub type Page<T> = (Vec<T>, Pagination);

/// Trait defining every LMS operation.
///
/// Operations that act on "the current user" take a [`Caller`]; the
/// transport is responsible for resolving it from the bearer token.
#[async_trait]
pub trait Lms: Send + Sync {
    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email, password and role.
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse>;

    /// The current session user.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::NotAuthenticated` if `caller` is `None`.
    async fn me(&self, caller: Option<&Caller>) -> Result<UserProfile>;

    /// Register a student account.
    async fn register(&self, request: RegisterRequest) -> Result<UserProfile>;

    /// Set an account password.
    async fn set_password(&self, request: SetPasswordRequest) -> Result<()>;

    // =========================================================================
    // Courses
    // =========================================================================

    /// List courses.
    async fn list_courses(&self, page: PageRequest) -> Result<Page<Course>>;

    /// Active courses.
    async fn available_courses(&self) -> Result<Vec<Course>>;

    /// Courses taught by the caller.
    async fn instructor_courses(&self, caller: &Caller) -> Result<Vec<Course>>;

    /// Fetch one course.
    async fn get_course(&self, course_id: &CourseId) -> Result<Course>;

    /// Create a course.
    async fn create_course(&self, caller: &Caller, request: CreateCourseRequest) -> Result<Course>;

    /// Update a course.
    async fn update_course(&self, course_id: &CourseId, patch: CoursePatch) -> Result<Course>;

    /// Delete a course without touching dependent records.
    async fn delete_course(&self, course_id: &CourseId) -> Result<()>;

    // =========================================================================
    // Users
    // =========================================================================

    /// List users, optionally by role.
    async fn list_users(&self, role: Option<Role>, page: PageRequest) -> Result<Page<User>>;

    /// All students.
    async fn students(&self) -> Result<Vec<User>>;

    /// Fetch one user.
    async fn get_user(&self, user_id: &UserId) -> Result<User>;

    /// Create a user.
    async fn create_user(&self, request: CreateUserRequest) -> Result<User>;

    /// Update a user.
    async fn update_user(&self, user_id: &UserId, patch: UserPatch) -> Result<User>;

    /// Delete a user.
    async fn delete_user(&self, user_id: &UserId) -> Result<()>;

    /// Activate or deactivate a user.
    async fn set_user_status(&self, user_id: &UserId, is_active: bool) -> Result<User>;

    /// Replace the set of courses an instructor teaches.
    async fn assign_instructor_courses(
        &self,
        user_id: &UserId,
        course_ids: Vec<CourseId>,
    ) -> Result<Vec<Course>>;

    // =========================================================================
    // Enrollments
    // =========================================================================

    /// List enrollments.
    async fn list_enrollments(&self, page: PageRequest) -> Result<Page<Enrollment>>;

    /// Enroll a student (the caller by default).
    async fn create_enrollment(
        &self,
        caller: &Caller,
        request: CreateEnrollmentRequest,
    ) -> Result<Enrollment>;

    /// The caller's enrollments.
    async fn student_enrollments(&self, caller: &Caller) -> Result<Vec<Enrollment>>;

    /// Update an enrollment.
    async fn update_enrollment(
        &self,
        enrollment_id: &EnrollmentId,
        patch: EnrollmentPatch,
    ) -> Result<Enrollment>;

    /// Delete an enrollment.
    async fn delete_enrollment(&self, enrollment_id: &EnrollmentId) -> Result<()>;

    // =========================================================================
    // Assignments and submissions
    // =========================================================================

    /// List assignments, optionally by course.
    async fn list_assignments(&self, course: Option<&CourseId>) -> Result<Vec<Assignment>>;

    /// Assignments in the caller's courses.
    async fn enrolled_assignments(&self, caller: &Caller) -> Result<Vec<Assignment>>;

    /// Create an assignment.
    async fn create_assignment(&self, caller: &Caller, upload: Upload) -> Result<Assignment>;

    /// Update an assignment.
    async fn update_assignment(
        &self,
        assignment_id: &AssignmentId,
        patch: AssignmentPatch,
    ) -> Result<Assignment>;

    /// Delete an assignment and its submissions.
    async fn delete_assignment(&self, assignment_id: &AssignmentId) -> Result<()>;

    /// Submissions for an assignment.
    async fn list_submissions(&self, assignment_id: &AssignmentId) -> Result<Vec<Submission>>;

    /// The caller's submissions.
    async fn my_submissions(&self, caller: &Caller) -> Result<Vec<Submission>>;

    /// Submit a file.
    async fn create_submission(
        &self,
        caller: &Caller,
        assignment_id: &AssignmentId,
        upload: Upload,
    ) -> Result<Submission>;

    /// Grade a submission.
    async fn grade_submission(
        &self,
        assignment_id: &AssignmentId,
        submission_id: &SubmissionId,
        grade: SubmissionGrade,
    ) -> Result<Submission>;

    /// Delete a submission.
    async fn delete_submission(
        &self,
        assignment_id: &AssignmentId,
        submission_id: &SubmissionId,
    ) -> Result<()>;

    // =========================================================================
    // Materials
    // =========================================================================

    /// List materials, optionally by course.
    async fn list_materials(&self, course: Option<&CourseId>) -> Result<Vec<Material>>;

    /// Materials in the caller's courses.
    async fn enrolled_materials(&self, caller: &Caller) -> Result<Vec<Material>>;

    /// Upload a material.
    async fn create_material(&self, caller: &Caller, upload: Upload) -> Result<Material>;

    /// Update a material.
    async fn update_material(&self, material_id: &MaterialId, patch: MaterialPatch)
        -> Result<Material>;

    /// Delete a material.
    async fn delete_material(&self, material_id: &MaterialId) -> Result<()>;

    // =========================================================================
    // Results
    // =========================================================================

    /// List results.
    async fn list_results(&self, page: PageRequest) -> Result<Page<CourseResult>>;

    /// The caller's results.
    async fn student_results(&self, caller: &Caller) -> Result<Vec<CourseResult>>;

    /// Create or replace the result for a (student, course) pair.
    async fn upsert_result(&self, request: UpsertResultRequest) -> Result<CourseResult>;

    /// Update a result.
    async fn update_result(&self, result_id: &ResultId, patch: ResultPatch) -> Result<CourseResult>;

    /// Delete a result.
    async fn delete_result(&self, result_id: &ResultId) -> Result<()>;

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Headline counts.
    async fn dashboard_stats(&self) -> Result<DashboardStats>;

    /// Most recent enrollments.
    async fn recent_enrollments(&self) -> Result<Vec<RecentEnrollment>>;

    /// Per-course performance.
    async fn course_performance(&self) -> Result<Vec<CoursePerformance>>;

    /// Consolidated metrics.
    async fn dashboard_metrics(&self) -> Result<DashboardMetrics>;

    /// Material and assignment counts.
    async fn dashboard_counts(&self) -> Result<DashboardCounts>;
}

/// The main LMS service implementation.
pub struct LmsService<S: Store, T: TokenIssuer> {
    store: Arc<S>,
    tokens: Arc<T>,
    config: ServiceConfig,
}

impl<S: Store, T: TokenIssuer> LmsService<S, T> {
    /// Create a new service.
    #[must_use]
    pub fn new(store: Arc<S>, tokens: Arc<T>, config: ServiceConfig) -> Self {
        Self {
            store,
            tokens,
            config,
        }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(store: Arc<S>, tokens: Arc<T>) -> Self {
        Self::new(store, tokens, ServiceConfig::default())
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[async_trait]
impl<S: Store + 'static, T: TokenIssuer + 'static> Lms for LmsService<S, T> {
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        auth::login(&*self.store, &*self.tokens, &self.config.auth, &request)
    }

    async fn me(&self, caller: Option<&Caller>) -> Result<UserProfile> {
        auth::me(&*self.store, caller)
    }

    async fn register(&self, request: RegisterRequest) -> Result<UserProfile> {
        auth::register(&*self.store, &self.config.auth, request)
    }

    async fn set_password(&self, request: SetPasswordRequest) -> Result<()> {
        auth::set_password(&*self.store, &self.config.auth, &request)
    }

    async fn list_courses(&self, page: PageRequest) -> Result<Page<Course>> {
        courses::list(&*self.store, page)
    }

    async fn available_courses(&self) -> Result<Vec<Course>> {
        courses::available(&*self.store)
    }

    async fn instructor_courses(&self, caller: &Caller) -> Result<Vec<Course>> {
        courses::by_instructor(&*self.store, caller)
    }

    async fn get_course(&self, course_id: &CourseId) -> Result<Course> {
        courses::get(&*self.store, course_id)
    }

    async fn create_course(&self, caller: &Caller, request: CreateCourseRequest) -> Result<Course> {
        courses::create(&*self.store, caller, request)
    }

    async fn update_course(&self, course_id: &CourseId, patch: CoursePatch) -> Result<Course> {
        courses::update(&*self.store, course_id, patch)
    }

    async fn delete_course(&self, course_id: &CourseId) -> Result<()> {
        courses::delete(&*self.store, course_id)
    }

    async fn list_users(&self, role: Option<Role>, page: PageRequest) -> Result<Page<User>> {
        users::list(&*self.store, role, page)
    }

    async fn students(&self) -> Result<Vec<User>> {
        users::students(&*self.store)
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User> {
        users::get(&*self.store, user_id)
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        users::create(&*self.store, &self.config.auth, request)
    }

    async fn update_user(&self, user_id: &UserId, patch: UserPatch) -> Result<User> {
        users::update(&*self.store, user_id, patch)
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<()> {
        users::delete(&*self.store, user_id)
    }

    async fn set_user_status(&self, user_id: &UserId, is_active: bool) -> Result<User> {
        users::set_status(&*self.store, user_id, is_active)
    }

    async fn assign_instructor_courses(
        &self,
        user_id: &UserId,
        course_ids: Vec<CourseId>,
    ) -> Result<Vec<Course>> {
        users::assign_instructor_courses(&*self.store, user_id, &course_ids)
    }

    async fn list_enrollments(&self, page: PageRequest) -> Result<Page<Enrollment>> {
        enrollments::list(&*self.store, page)
    }

    async fn create_enrollment(
        &self,
        caller: &Caller,
        request: CreateEnrollmentRequest,
    ) -> Result<Enrollment> {
        enrollments::create(&*self.store, caller, request)
    }

    async fn student_enrollments(&self, caller: &Caller) -> Result<Vec<Enrollment>> {
        enrollments::for_student(&*self.store, caller)
    }

    async fn update_enrollment(
        &self,
        enrollment_id: &EnrollmentId,
        patch: EnrollmentPatch,
    ) -> Result<Enrollment> {
        enrollments::update(&*self.store, enrollment_id, patch)
    }

    async fn delete_enrollment(&self, enrollment_id: &EnrollmentId) -> Result<()> {
        enrollments::delete(&*self.store, enrollment_id)
    }

    async fn list_assignments(&self, course: Option<&CourseId>) -> Result<Vec<Assignment>> {
        assignments::list(&*self.store, course)
    }

    async fn enrolled_assignments(&self, caller: &Caller) -> Result<Vec<Assignment>> {
        assignments::enrolled(&*self.store, caller)
    }

    async fn create_assignment(&self, caller: &Caller, upload: Upload) -> Result<Assignment> {
        assignments::create(&*self.store, caller, &upload)
    }

    async fn update_assignment(
        &self,
        assignment_id: &AssignmentId,
        patch: AssignmentPatch,
    ) -> Result<Assignment> {
        assignments::update(&*self.store, assignment_id, patch)
    }

    async fn delete_assignment(&self, assignment_id: &AssignmentId) -> Result<()> {
        assignments::delete(&*self.store, assignment_id)
    }

    async fn list_submissions(&self, assignment_id: &AssignmentId) -> Result<Vec<Submission>> {
        assignments::submissions(&*self.store, assignment_id)
    }

    async fn my_submissions(&self, caller: &Caller) -> Result<Vec<Submission>> {
        assignments::my_submissions(&*self.store, caller)
    }

    async fn create_submission(
        &self,
        caller: &Caller,
        assignment_id: &AssignmentId,
        upload: Upload,
    ) -> Result<Submission> {
        assignments::submit(&*self.store, caller, assignment_id, &upload)
    }

    async fn grade_submission(
        &self,
        assignment_id: &AssignmentId,
        submission_id: &SubmissionId,
        grade: SubmissionGrade,
    ) -> Result<Submission> {
        assignments::grade(&*self.store, assignment_id, submission_id, grade)
    }

    async fn delete_submission(
        &self,
        assignment_id: &AssignmentId,
        submission_id: &SubmissionId,
    ) -> Result<()> {
        assignments::delete_submission(&*self.store, assignment_id, submission_id)
    }

    async fn list_materials(&self, course: Option<&CourseId>) -> Result<Vec<Material>> {
        materials::list(&*self.store, course)
    }

    async fn enrolled_materials(&self, caller: &Caller) -> Result<Vec<Material>> {
        materials::enrolled(&*self.store, caller)
    }

    async fn create_material(&self, caller: &Caller, upload: Upload) -> Result<Material> {
        materials::create(&*self.store, caller, &upload)
    }

    async fn update_material(
        &self,
        material_id: &MaterialId,
        patch: MaterialPatch,
    ) -> Result<Material> {
        materials::update(&*self.store, material_id, patch)
    }

    async fn delete_material(&self, material_id: &MaterialId) -> Result<()> {
        materials::delete(&*self.store, material_id)
    }

    async fn list_results(&self, page: PageRequest) -> Result<Page<CourseResult>> {
        results::list(&*self.store, page)
    }

    async fn student_results(&self, caller: &Caller) -> Result<Vec<CourseResult>> {
        results::for_student(&*self.store, caller)
    }

    async fn upsert_result(&self, request: UpsertResultRequest) -> Result<CourseResult> {
        results::upsert(&*self.store, &request)
    }

    async fn update_result(&self, result_id: &ResultId, patch: ResultPatch) -> Result<CourseResult> {
        results::update(&*self.store, result_id, &patch)
    }

    async fn delete_result(&self, result_id: &ResultId) -> Result<()> {
        results::delete(&*self.store, result_id)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        dashboard::stats(&*self.store)
    }

    async fn recent_enrollments(&self) -> Result<Vec<RecentEnrollment>> {
        dashboard::recent_enrollments(&*self.store, self.config.recent_enrollments_limit)
    }

    async fn course_performance(&self) -> Result<Vec<CoursePerformance>> {
        dashboard::course_performance(&*self.store)
    }

    async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        dashboard::metrics(&*self.store, self.config.recent_enrollments_limit)
    }

    async fn dashboard_counts(&self) -> Result<DashboardCounts> {
        dashboard::counts(&*self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LmsError;
    use lms_auth::{AuthConfig, MockJwtValidator};
    use lms_store::MemoryStore;

    fn create_test_service() -> LmsService<MemoryStore, MockJwtValidator> {
        let config = ServiceConfig {
            auth: AuthConfig {
                bcrypt_cost: 4,
                ..AuthConfig::default()
            },
            ..ServiceConfig::default()
        };
        LmsService::new(
            Arc::new(MemoryStore::with_demo_data()),
            Arc::new(MockJwtValidator),
            config,
        )
    }

    fn caller(id: &str, role: Role) -> Caller {
        Caller::new(UserId::new(id).unwrap(), role)
    }

    #[tokio::test]
    async fn login_then_me() {
        let service = create_test_service();
        let response = service
            .login(LoginRequest {
                email: "instructor@university.edu".into(),
                password: "password123".into(),
                role: Role::Instructor,
            })
            .await
            .unwrap();
        assert!(response.token.starts_with("test-token:instructor1:instructor"));

        let me = service
            .me(Some(&caller("instructor1", Role::Instructor)))
            .await
            .unwrap();
        assert_eq!(me, response.user);

        assert!(matches!(service.me(None).await, Err(LmsError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn enroll_through_service_updates_dashboard() {
        let service = create_test_service();
        let before = service.dashboard_stats().await.unwrap();

        let alex = caller("student3", Role::Student);
        service
            .create_enrollment(
                &alex,
                CreateEnrollmentRequest {
                    course_id: CourseId::new("course5").unwrap(),
                    student_id: None,
                },
            )
            .await
            .unwrap();

        let after = service.dashboard_stats().await.unwrap();
        assert_eq!(after.total_enrollments, before.total_enrollments + 1);
        assert_eq!(service.student_enrollments(&alex).await.unwrap().len(), 2);
        assert_eq!(service.enrolled_assignments(&alex).await.unwrap().len(), 2);

        let recent = service.recent_enrollments().await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].course.code, "ML301");
    }

    #[tokio::test]
    async fn recent_limit_follows_config() {
        let service = LmsService::new(
            Arc::new(MemoryStore::with_demo_data()),
            Arc::new(MockJwtValidator),
            ServiceConfig {
                recent_enrollments_limit: 2,
                ..ServiceConfig::default()
            },
        );
        assert_eq!(service.recent_enrollments().await.unwrap().len(), 2);
        assert_eq!(service.dashboard_metrics().await.unwrap().recent_activity.len(), 2);
    }

    #[tokio::test]
    async fn results_flow() {
        let service = create_test_service();
        let result = service
            .upsert_result(UpsertResultRequest {
                student: UserId::new("student2").unwrap(),
                course: CourseId::new("course1").unwrap(),
                ca_score: 80.0,
                final_exam_score: 90.0,
            })
            .await
            .unwrap();
        assert_eq!(result.final_percentage, Some(86));

        let jane = caller("student2", Role::Student);
        assert_eq!(service.student_results(&jane).await.unwrap().len(), 2);
        let (all, pagination) = service.list_results(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(pagination.total, 4);
        assert_eq!(pagination.pages, 2);
    }
}
