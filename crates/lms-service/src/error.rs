//! Error types for LMS operations.
//!
//! Every handler fails fast with one of these kinds. The message is what
//! the caller sees; [`LmsError::kind`] is the machine-readable code carried
//! alongside it in the failure envelope.

use lms_core::{GradeError, IdError};
use lms_store::StoreError;
use thiserror::Error;

/// A result type using `LmsError`.
pub type Result<T> = std::result::Result<T, LmsError>;

/// Errors that can occur in LMS operations.
#[derive(Debug, Error)]
pub enum LmsError {
    /// No session identity was supplied.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// No user matches the supplied email and role.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The supplied password does not match.
    #[error("Invalid password")]
    InvalidPassword,

    /// The user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// The course does not exist.
    #[error("Course not found")]
    CourseNotFound,

    /// The enrollment does not exist.
    #[error("Enrollment not found")]
    EnrollmentNotFound,

    /// The assignment does not exist.
    #[error("Assignment not found")]
    AssignmentNotFound,

    /// The submission does not exist.
    #[error("Submission not found")]
    SubmissionNotFound,

    /// The material does not exist.
    #[error("Material not found")]
    MaterialNotFound,

    /// The result does not exist.
    #[error("Result not found")]
    ResultNotFound,

    /// A user with the email already exists.
    #[error("User already exists")]
    UserAlreadyExists,

    /// The student already holds a seat in the course.
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,

    /// The course has no free seat.
    #[error("Course is full")]
    CourseFull,

    /// A score lies outside `[0, 100]`.
    #[error("{0}")]
    InvalidScore(#[from] GradeError),

    /// The request payload is missing a field or carries a bad value.
    #[error("{0}")]
    Validation(String),

    /// No handler matches the method and path.
    #[error("endpoint not found: {method} {path}")]
    RouteNotFound {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Authentication error.
    #[error("{0}")]
    Auth(#[from] lms_auth::AuthError),

    /// A response payload could not be encoded.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl LmsError {
    /// Build a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::EnrollmentNotFound => "ENROLLMENT_NOT_FOUND",
            Self::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            Self::SubmissionNotFound => "SUBMISSION_NOT_FOUND",
            Self::MaterialNotFound => "MATERIAL_NOT_FOUND",
            Self::ResultNotFound => "RESULT_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::AlreadyEnrolled => "ALREADY_ENROLLED",
            Self::CourseFull => "COURSE_FULL",
            Self::InvalidScore(_) => "INVALID_SCORE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RouteNotFound { .. } => "NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::Encode(_) => "INTERNAL_ERROR",
            Self::Auth(e) if e.requires_login() => "NOT_AUTHENTICATED",
            Self::Auth(lms_auth::AuthError::PasswordTooShort { .. }) => "VALIDATION_ERROR",
            Self::Auth(_) => "AUTH_ERROR",
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotAuthenticated | Self::InvalidCredentials | Self::InvalidPassword => 401,
            Self::UserNotFound
            | Self::CourseNotFound
            | Self::EnrollmentNotFound
            | Self::AssignmentNotFound
            | Self::SubmissionNotFound
            | Self::MaterialNotFound
            | Self::ResultNotFound
            | Self::RouteNotFound { .. } => 404,
            Self::UserAlreadyExists | Self::AlreadyEnrolled | Self::CourseFull => 409,
            Self::InvalidScore(_) | Self::Validation(_) => 400,
            Self::Store(_) | Self::Encode(_) => 500,
            Self::Auth(e) => e.http_status_code(),
        }
    }

    /// Returns true for errors whose detail must not reach the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.http_status_code() >= 500
    }
}

impl From<IdError> for LmsError {
    fn from(err: IdError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Map `StoreError::NotFound` to the entity-specific not-found kind.
pub(crate) fn or_missing(err: StoreError, missing: LmsError) -> LmsError {
    match err {
        StoreError::NotFound => missing,
        other => LmsError::Store(other),
    }
}

/// Map a store failure on an enrollment write to the enrollment error kinds.
pub(crate) fn enrollment_conflict(err: StoreError) -> LmsError {
    match err {
        StoreError::NotFound => LmsError::CourseNotFound,
        StoreError::DuplicateEnrollment => LmsError::AlreadyEnrolled,
        StoreError::CapacityReached => LmsError::CourseFull,
        other => LmsError::Store(other),
    }
}
