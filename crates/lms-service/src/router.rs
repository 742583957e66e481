//! In-process request router.
//!
//! Maps a method and an `/api/...` path onto a [`Route`]. Exact paths are
//! matched first, so `/api/courses/available` never reaches the `{id}`
//! branch, followed by collection paths and then `{id}` and sub-resource
//! forms.

use http::Method;
use lms_core::{
    AssignmentId, CourseId, EnrollmentId, MaterialId, ResultId, SubmissionId, UserId,
};

use crate::error::{LmsError, Result};
use crate::types::ListQuery;

/// A resolved operation together with its path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Route {
    // Auth
    Login,
    Me,
    SetPassword,
    Register,

    // Dashboard
    DashboardStats,
    RecentEnrollments,
    CoursePerformance,
    DashboardMetrics,
    DashboardCounts,

    // Courses
    ListCourses,
    AvailableCourses,
    InstructorCourses,
    CreateCourse,
    GetCourse(CourseId),
    UpdateCourse(CourseId),
    DeleteCourse(CourseId),

    // Users
    ListUsers,
    Students,
    CreateUser,
    GetUser(UserId),
    UpdateUser(UserId),
    DeleteUser(UserId),
    SetUserStatus(UserId),
    AssignInstructorCourses(UserId),

    // Enrollments
    ListEnrollments,
    CreateEnrollment,
    StudentEnrollments,
    UpdateEnrollment(EnrollmentId),
    DeleteEnrollment(EnrollmentId),

    // Assignments and submissions
    ListAssignments,
    EnrolledAssignments,
    MySubmissions,
    CreateAssignment,
    UpdateAssignment(AssignmentId),
    DeleteAssignment(AssignmentId),
    ListSubmissions(AssignmentId),
    CreateSubmission(AssignmentId),
    GradeSubmission(AssignmentId, SubmissionId),
    DeleteSubmission(AssignmentId, SubmissionId),

    // Materials
    ListMaterials,
    EnrolledMaterials,
    CreateMaterial,
    UpdateMaterial(MaterialId),
    DeleteMaterial(MaterialId),

    // Results
    ListResults,
    StudentResults,
    UpsertResult,
    UpdateResult(ResultId),
    DeleteResult(ResultId),
}

fn is_update(method: &Method) -> bool {
    method == Method::PUT || method == Method::PATCH
}

impl Route {
    /// Resolve a method and path (optionally carrying a query string).
    ///
    /// # Errors
    ///
    /// Returns `LmsError::RouteNotFound` when nothing matches, and
    /// `LmsError::Validation` for a malformed query string.
    pub fn resolve(method: &Method, path: &str) -> Result<(Self, ListQuery)> {
        let (raw_path, raw_query) = path.split_once('?').unwrap_or((path, ""));
        let not_found = || LmsError::RouteNotFound {
            method: method.to_string(),
            path: raw_path.to_string(),
        };

        let segments: Vec<&str> = raw_path
            .strip_prefix("/api/")
            .ok_or_else(not_found)?
            .trim_end_matches('/')
            .split('/')
            .collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(not_found());
        }

        let route = Self::match_exact(method, &segments)
            .or_else(|| Self::match_collection(method, &segments))
            .map(Ok)
            .or_else(|| Self::match_item(method, &segments).transpose())
            .ok_or_else(not_found)??;

        let query = ListQuery::parse(raw_query)?;
        Ok((route, query))
    }

    fn match_exact(method: &Method, segments: &[&str]) -> Option<Self> {
        let get = method == Method::GET;
        let post = method == Method::POST;
        let route = match segments {
            ["auth", "login"] if post => Self::Login,
            ["auth", "me"] if get => Self::Me,
            ["auth", "set-password"] if post => Self::SetPassword,
            ["auth", "register"] if post => Self::Register,

            ["dashboard", "stats"] if get => Self::DashboardStats,
            ["dashboard", "recent-enrollments"] if get => Self::RecentEnrollments,
            ["dashboard", "course-performance"] if get => Self::CoursePerformance,
            ["dashboard", "metrics"] if get => Self::DashboardMetrics,
            ["dashboard", "counts"] if get => Self::DashboardCounts,

            ["courses", "available"] if get => Self::AvailableCourses,
            ["courses", "instructor"] if get => Self::InstructorCourses,
            ["users", "students"] if get => Self::Students,
            ["enrollments", "student", "me"] if get => Self::StudentEnrollments,
            ["assignments", "enrolled"] if get => Self::EnrolledAssignments,
            ["assignments", "submissions"] if get => Self::MySubmissions,
            ["materials", "enrolled"] if get => Self::EnrolledMaterials,
            ["results", "student", "me"] if get => Self::StudentResults,
            _ => return None,
        };
        Some(route)
    }

    fn match_collection(method: &Method, segments: &[&str]) -> Option<Self> {
        let [resource] = segments else {
            return None;
        };
        let route = match (*method == Method::GET, *resource) {
            (true, "courses") => Self::ListCourses,
            (true, "users") => Self::ListUsers,
            (true, "enrollments") => Self::ListEnrollments,
            (true, "assignments") => Self::ListAssignments,
            (true, "materials") => Self::ListMaterials,
            (true, "results") => Self::ListResults,
            (false, resource) if method == Method::POST => match resource {
                "courses" => Self::CreateCourse,
                "users" => Self::CreateUser,
                "enrollments" => Self::CreateEnrollment,
                "assignments" => Self::CreateAssignment,
                "materials" => Self::CreateMaterial,
                "results" => Self::UpsertResult,
                _ => return None,
            },
            _ => return None,
        };
        Some(route)
    }

    fn match_item(method: &Method, segments: &[&str]) -> Result<Option<Self>> {
        let get = method == Method::GET;
        let post = method == Method::POST;
        let patch = method == Method::PATCH;
        let update = is_update(method);
        let delete = method == Method::DELETE;

        let route = match segments {
            ["courses", id] if get => Self::GetCourse(CourseId::new(*id)?),
            ["courses", id] if update => Self::UpdateCourse(CourseId::new(*id)?),
            ["courses", id] if delete => Self::DeleteCourse(CourseId::new(*id)?),

            ["users", id] if get => Self::GetUser(UserId::new(*id)?),
            ["users", id] if update => Self::UpdateUser(UserId::new(*id)?),
            ["users", id] if delete => Self::DeleteUser(UserId::new(*id)?),
            ["users", id, "status"] if patch => Self::SetUserStatus(UserId::new(*id)?),
            ["users", id, "instructor-courses"] if update => {
                Self::AssignInstructorCourses(UserId::new(*id)?)
            }

            ["enrollments", id] if update => Self::UpdateEnrollment(EnrollmentId::new(*id)?),
            ["enrollments", id] if delete => Self::DeleteEnrollment(EnrollmentId::new(*id)?),

            ["assignments", id] if update => Self::UpdateAssignment(AssignmentId::new(*id)?),
            ["assignments", id] if delete => Self::DeleteAssignment(AssignmentId::new(*id)?),
            ["assignments", id, "submissions"] if get => {
                Self::ListSubmissions(AssignmentId::new(*id)?)
            }
            ["assignments", id, "submissions"] if post => {
                Self::CreateSubmission(AssignmentId::new(*id)?)
            }
            ["assignments", id, "submissions", sid] if update => {
                Self::GradeSubmission(AssignmentId::new(*id)?, SubmissionId::new(*sid)?)
            }
            ["assignments", id, "submissions", sid] if delete => {
                Self::DeleteSubmission(AssignmentId::new(*id)?, SubmissionId::new(*sid)?)
            }

            ["materials", id] if update => Self::UpdateMaterial(MaterialId::new(*id)?),
            ["materials", id] if delete => Self::DeleteMaterial(MaterialId::new(*id)?),

            ["results", id] if update => Self::UpdateResult(ResultId::new(*id)?),
            ["results", id] if delete => Self::DeleteResult(ResultId::new(*id)?),
            _ => return Ok(None),
        };
        Ok(Some(route))
    }

    /// Whether the operation needs a resolved caller.
    #[must_use]
    pub const fn requires_caller(&self) -> bool {
        matches!(
            self,
            Self::InstructorCourses
                | Self::CreateCourse
                | Self::CreateEnrollment
                | Self::StudentEnrollments
                | Self::EnrolledAssignments
                | Self::MySubmissions
                | Self::CreateAssignment
                | Self::CreateSubmission(_)
                | Self::EnrolledMaterials
                | Self::CreateMaterial
                | Self::StudentResults
        )
    }
}
