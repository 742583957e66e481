//! Domain types held by the entity store.
//!
//! Records serialize with camelCase field names and the identifier as `_id`,
//! which is the shape every client of the API consumes.
//!
//! # Snapshots
//!
//! Several records embed a copy of another record's display fields
//! ([`InstructorSummary`], [`StudentSummary`], [`CourseSummary`],
//! [`AuthorSummary`]). These are taken when the embedding record is created
//! and are never refreshed: renaming a user does not rename the instructor
//! shown on courses created before the rename.

use chrono::{DateTime, Utc};
use lms_core::{
    AssignmentId, CourseId, EnrollmentId, LetterGrade, MaterialId, ResultId, SubmissionId, UserId,
};
use serde::{Deserialize, Serialize};

pub use lms_core::Role;

// =============================================================================
// Users
// =============================================================================

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email, compared case-sensitively.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Account role.
    pub role: Role,
    /// Whether the account is enabled.
    pub is_active: bool,
    /// Student number such as `STU001`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Staff number such as `INST001`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<String>,
    /// bcrypt hash of a password set through registration or set-password.
    ///
    /// Never serialized.
    #[serde(skip)]
    pub password_hash: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name, `"first last"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Snapshot used as a course's instructor.
    #[must_use]
    pub fn instructor_summary(&self) -> InstructorSummary {
        InstructorSummary {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }

    /// Snapshot used as an enrollment's, submission's or result's student.
    #[must_use]
    pub fn student_summary(&self) -> StudentSummary {
        StudentSummary {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            student_id: self.student_id.clone(),
        }
    }

    /// Snapshot used as the creator of an assignment or uploader of a material.
    #[must_use]
    pub fn author_summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: Some(self.id.clone()),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// Instructor fields copied into a course at assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorSummary {
    /// Instructor's user id.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email.
    pub email: String,
}

/// Student fields copied into enrollments, submissions and results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    /// Student's user id.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email.
    #[serde(default)]
    pub email: String,
    /// Student number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

/// Course fields copied into enrollments, assignments, materials and results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    /// Course id.
    #[serde(rename = "_id")]
    pub id: CourseId,
    /// Course title.
    pub title: String,
    /// Course code such as `CS101`.
    pub code: String,
}

/// Name of the user who created an assignment or uploaded a material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    /// Author's user id, absent for anonymous creation.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl AuthorSummary {
    /// Placeholder author for records created without a session.
    #[must_use]
    pub fn system() -> Self {
        Self {
            id: None,
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
        }
    }
}

/// Metadata of an uploaded file.
///
/// The declared values are stored as given; the content is not inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    /// Stored file name.
    pub file_name: String,
    /// Name of the file on the uploader's machine.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Download location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// =============================================================================
// Courses
// =============================================================================

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseLevel {
    /// Introductory.
    #[default]
    Beginner,
    /// Requires prior courses.
    Intermediate,
    /// Upper level.
    Advanced,
}

/// Publication status of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    /// Open for enrollment.
    #[default]
    Active,
    /// Temporarily closed.
    Inactive,
    /// Retired.
    Archived,
}

/// A course offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: CourseId,
    /// Title.
    pub title: String,
    /// Human-readable code, not guaranteed unique.
    pub code: String,
    /// Description.
    pub description: String,
    /// Instructor snapshot, `None` when unassigned.
    pub instructor: Option<InstructorSummary>,
    /// Seat limit.
    pub capacity: u32,
    /// Seats taken by non-dropped enrollments.
    pub enrolled: u32,
    /// Free-form duration such as `"16 weeks"`.
    pub duration: String,
    /// Credit hours.
    pub credits: u32,
    /// Difficulty level.
    pub level: CourseLevel,
    /// Category label.
    pub category: String,
    /// Publication status.
    pub status: CourseStatus,
    /// First day of teaching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// Last day of teaching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Snapshot embedded in dependent records.
    #[must_use]
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            code: self.code.clone(),
        }
    }

    /// Whether the course is taught by `user_id`.
    #[must_use]
    pub fn is_taught_by(&self, user_id: &UserId) -> bool {
        self.instructor.as_ref().is_some_and(|i| &i.id == user_id)
    }

    /// Whether every seat is taken.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.enrolled >= self.capacity
    }
}

// =============================================================================
// Enrollments
// =============================================================================

/// Status of an enrollment.
///
/// `enrolled` is accepted as an alias of `active` and `graduated` as an
/// alias of `completed`; responses always use the canonical names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Attending the course.
    #[default]
    #[serde(alias = "enrolled")]
    Active,
    /// Finished the course.
    #[serde(alias = "graduated")]
    Completed,
    /// Left the course; frees the seat.
    Dropped,
    /// Temporarily barred.
    Suspended,
    /// Awaiting approval.
    Pending,
}

impl EnrollmentStatus {
    /// Whether the enrollment holds a seat in its course.
    #[must_use]
    pub const fn occupies_seat(self) -> bool {
        !matches!(self, Self::Dropped)
    }
}

/// A student's enrollment in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: EnrollmentId,
    /// Student snapshot.
    pub student: StudentSummary,
    /// Course snapshot.
    pub course: CourseSummary,
    /// Current status.
    pub status: EnrollmentStatus,
    /// Progress percentage, 0 to 100.
    pub progress: u8,
    /// When the student enrolled.
    pub enrollment_date: DateTime<Utc>,
    /// Letter grade, if graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    /// Numeric score, if graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Assignments and submissions
// =============================================================================

/// Visibility of an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Accepting submissions.
    #[default]
    Active,
    /// No longer accepting submissions.
    Closed,
    /// Not yet published.
    Draft,
}

/// A course assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: AssignmentId,
    /// Title.
    pub title: String,
    /// Instructions.
    pub description: String,
    /// Course snapshot.
    pub course: CourseSummary,
    /// Deadline.
    pub due_date: DateTime<Utc>,
    /// Maximum attainable points.
    pub max_points: u32,
    /// Visibility.
    #[serde(default)]
    pub status: AssignmentStatus,
    /// Creator snapshot.
    pub created_by: AuthorSummary,
    /// Optional handout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<FileMeta>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Grading state of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Waiting for grading.
    #[default]
    Submitted,
    /// Grade recorded.
    Graded,
}

/// A student's submission to an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: SubmissionId,
    /// Assignment this submission answers.
    pub assignment: AssignmentId,
    /// Assignment title at submission time.
    pub assignment_title: String,
    /// Student snapshot.
    pub student: StudentSummary,
    /// Uploaded file.
    pub file: FileMeta,
    /// Grading state.
    pub status: SubmissionStatus,
    /// Grade given by the instructor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    /// Instructor feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Materials
// =============================================================================

/// Declared kind of a material file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// PDF document.
    Pdf,
    /// Video recording.
    Video,
    /// Image.
    Image,
    /// Generic document.
    Document,
    /// Word document.
    Docx,
    /// Anything else.
    #[default]
    Other,
}

/// A course material such as lecture notes or a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: MaterialId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Declared file kind.
    pub file_type: FileType,
    /// Course snapshot.
    pub course: CourseSummary,
    /// File metadata, flattened into the record.
    #[serde(flatten)]
    pub file: FileMeta,
    /// Uploader snapshot.
    pub uploaded_by: AuthorSummary,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Results
// =============================================================================

/// Outcome of a course result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Final percentage at or above the pass mark.
    Passed,
    /// Final percentage below the pass mark.
    Failed,
    /// Scores not yet complete.
    #[default]
    Pending,
    /// Coursework not finished.
    Incomplete,
}

/// A student's final result in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResult {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: ResultId,
    /// Student snapshot.
    pub student: StudentSummary,
    /// Course snapshot.
    pub course: CourseSummary,
    /// Continuous-assessment score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_score: Option<f64>,
    /// Final exam score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_exam_score: Option<f64>,
    /// Weighted percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_percentage: Option<u8>,
    /// Letter grade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_grade: Option<LetterGrade>,
    /// Outcome.
    pub status: ResultStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
