//! Request and response types for LMS operations.
//!
//! JSON payloads use camelCase field names. Multipart payloads arrive as an
//! [`Upload`]: a flat field map plus an optional file part.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use lms_auth::AuthConfig;
use lms_core::{CourseId, PageRequest, Role, UserId};
use lms_store::{
    AssignmentStatus, CourseLevel, CourseStatus, EnrollmentStatus, FileMeta, FileType, ResultStatus,
    User,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LmsError, Result};

/// The resolved identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The calling user.
    pub user_id: UserId,
    /// The role the caller logged in with.
    pub role: Role,
}

impl Caller {
    /// Create a caller identity.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Configuration for the LMS service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// How many enrollments the recent-enrollments view returns.
    #[serde(default = "ServiceConfig::default_recent_limit")]
    pub recent_enrollments_limit: usize,
    /// Artificial delay applied by the in-process dispatcher.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl ServiceConfig {
    const fn default_recent_limit() -> usize {
        5
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            recent_enrollments_limit: Self::default_recent_limit(),
            simulated_latency_ms: 0,
        }
    }
}

/// Query string accepted by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    /// 1-indexed page.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Role filter for user lists.
    #[serde(default)]
    pub role: Option<Role>,
    /// Course filter for assignment and material lists.
    #[serde(default)]
    pub course: Option<CourseId>,
}

impl ListQuery {
    /// Parse a raw query string (without the leading `?`).
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if a parameter has the wrong type.
    pub fn parse(query: &str) -> Result<Self> {
        if query.is_empty() {
            return Ok(Self::default());
        }
        serde_qs::from_str(query).map_err(|e| LmsError::validation(e.to_string()))
    }

    /// The pagination part of the query.
    #[must_use]
    pub const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }
}

// =============================================================================
// Uploads
// =============================================================================

/// A file received in a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Filename declared by the client.
    pub file_name: String,
    /// Content type declared by the client.
    pub content_type: Option<String>,
    /// The file content.
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Metadata for this file as stored under `/uploads/<folder>/`.
    ///
    /// The stored name is prefixed with the upload time in milliseconds so
    /// that repeated uploads of the same file do not collide.
    #[must_use]
    pub fn meta(&self, folder: &str) -> FileMeta {
        let safe: String = self
            .file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        let file_name = format!("{}-{safe}", Utc::now().timestamp_millis());

        FileMeta {
            url: Some(format!("/uploads/{folder}/{file_name}")),
            file_name,
            original_name: self.file_name.clone(),
            size: self.bytes.len() as u64,
            mime_type: self.content_type.clone(),
        }
    }
}

/// A multipart form: key/value fields plus an optional `file` part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upload {
    /// Text fields.
    pub fields: HashMap<String, String>,
    /// The `file` part, if any.
    pub file: Option<FilePart>,
}

impl Upload {
    /// Add a text field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Attach a file part.
    #[must_use]
    pub fn with_file(mut self, file: FilePart) -> Self {
        self.file = Some(file);
        self
    }

    /// Build an upload from a JSON object, stringifying scalar values.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if the value is not an object.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(LmsError::validation("Request body must be an object"));
        };

        let fields = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();

        Ok(Self { fields, file: None })
    }

    /// A trimmed, non-empty field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The first present field among `names`.
    #[must_use]
    pub fn get_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    /// A required field.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` naming the field if it is missing.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| LmsError::validation(format!("{name} is required")))
    }

    /// Parse an optional field.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if the field is present but malformed.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| LmsError::validation(format!("{name} is invalid: {raw}")))
            })
            .transpose()
    }

    /// Parse an optional enum field through its JSON string form.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if the value is not a known variant.
    pub fn parse_enum<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|raw| {
                serde_json::from_value(Value::String(raw.to_string()))
                    .map_err(|_| LmsError::validation(format!("{name} is invalid: {raw}")))
            })
            .transpose()
    }
}

/// Parse a date or date-time. Plain dates are taken as midnight UTC.
///
/// # Errors
///
/// Returns `LmsError::Validation` if the value is neither RFC 3339 nor
/// `YYYY-MM-DD`.
pub fn parse_datetime(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| LmsError::validation(format!("{field} is not a valid date: {raw}")))
}

// =============================================================================
// Auth
// =============================================================================

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// The portal being logged into.
    pub role: Role,
}

/// Self-registration payload. New accounts are always students.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// Initial password.
    #[serde(default)]
    pub password: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Set or replace an account password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPasswordRequest {
    /// Account email.
    pub email: String,
    /// New password.
    pub password: String,
}

/// The user fields returned to clients after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account email.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Student number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Staff number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            student_id: user.student_id.clone(),
            instructor_id: user.instructor_id.clone(),
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The logged-in user.
    pub user: UserProfile,
}

// =============================================================================
// Courses
// =============================================================================

/// Payload for creating a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    /// Course title.
    pub title: String,
    /// Course code such as `CS101`.
    pub code: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Defaults to the calling instructor.
    #[serde(default)]
    pub instructor_id: Option<UserId>,
    /// Seats available.
    pub capacity: u32,
    /// Human-readable length, e.g. `12 weeks`.
    #[serde(default)]
    pub duration: String,
    /// Defaults to 3.
    #[serde(default)]
    pub credits: Option<u32>,
    /// Defaults to beginner.
    #[serde(default)]
    pub level: Option<CourseLevel>,
    /// Defaults to `General`.
    #[serde(default)]
    pub category: Option<String>,
    /// First day of teaching.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Last day of teaching.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Fields of a course that may be changed. Absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    /// New title.
    pub title: Option<String>,
    /// New course code.
    pub code: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Instructor to assign. Must have the instructor role.
    pub instructor_id: Option<UserId>,
    /// New seat capacity.
    pub capacity: Option<u32>,
    /// New duration text.
    pub duration: Option<String>,
    /// New credit value.
    pub credits: Option<u32>,
    /// New level.
    pub level: Option<CourseLevel>,
    /// New category.
    pub category: Option<String>,
    /// New status.
    pub status: Option<CourseStatus>,
    /// New start date.
    pub start_date: Option<DateTime<Utc>>,
    /// New end date.
    pub end_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Users
// =============================================================================

/// Payload for creating a user directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Defaults to student.
    #[serde(default)]
    pub role: Option<Role>,
    /// Optional initial password. Without one the default password applies.
    #[serde(default)]
    pub password: Option<String>,
    /// Student number. Generated for students when absent.
    #[serde(default)]
    pub student_id: Option<String>,
    /// Instructor number. Generated for instructors when absent.
    #[serde(default)]
    pub instructor_id: Option<String>,
}

/// Fields of a user that may be changed. Absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New login email.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// Whether the account may log in.
    pub is_active: Option<bool>,
    /// New student number.
    pub student_id: Option<String>,
    /// New instructor number.
    pub instructor_id: Option<String>,
}

/// Activation toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Whether the account may log in.
    pub is_active: bool,
}

/// The full set of courses an instructor teaches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorCourses {
    /// Courses to assign. Courses not listed are unassigned.
    #[serde(default)]
    pub course_ids: Vec<CourseId>,
}

// =============================================================================
// Enrollments
// =============================================================================

/// Payload for enrolling a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    /// Course to enroll in.
    #[serde(alias = "course")]
    pub course_id: CourseId,
    /// Student to enroll. Defaults to the caller.
    #[serde(default, alias = "student")]
    pub student_id: Option<UserId>,
}

/// Fields of an enrollment that may be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentPatch {
    /// New status. Moving in or out of `dropped` moves the seat.
    pub status: Option<EnrollmentStatus>,
    /// Progress percentage.
    pub progress: Option<u8>,
    /// Letter grade.
    pub grade: Option<String>,
    /// Numeric score.
    pub score: Option<f64>,
}

// =============================================================================
// Assignments and submissions
// =============================================================================

/// Fields of an assignment that may be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New maximum points.
    pub max_points: Option<u32>,
    /// New status.
    pub status: Option<AssignmentStatus>,
}

/// Grade for a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionGrade {
    /// The grade awarded.
    pub grade: String,
    /// Feedback for the student.
    #[serde(default)]
    pub remarks: Option<String>,
}

// =============================================================================
// Materials
// =============================================================================

/// Fields of a material that may be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New file type.
    pub file_type: Option<FileType>,
}

// =============================================================================
// Results
// =============================================================================

/// Scores for a (student, course) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResultRequest {
    /// The student being graded.
    #[serde(alias = "studentId")]
    pub student: UserId,
    /// The course being graded.
    #[serde(alias = "courseId")]
    pub course: CourseId,
    /// Continuous assessment score in `[0, 100]`.
    pub ca_score: f64,
    /// Final exam score in `[0, 100]`.
    pub final_exam_score: f64,
}

/// Fields of a result that may be changed. New scores recompute the grade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPatch {
    /// New continuous assessment score.
    pub ca_score: Option<f64>,
    /// New final exam score.
    pub final_exam_score: Option<f64>,
    /// New status.
    pub status: Option<ResultStatus>,
}
