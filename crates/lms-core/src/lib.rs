//! Core types and utilities for the LMS data layer.
//!
//! This crate provides the foundational types used by every other crate:
//!
//! - **Identifiers**: Strongly-typed IDs for users, courses, enrollments and the rest
//! - **Envelope**: The `{ success, data | error }` wrapper and pagination math
//! - **Roles**: The admin / instructor / student account roles
//! - **Grading**: Weighted percentage and letter-grade derivation for results
//! - **Error types**: Common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use lms_core::{compute_result, CourseId, LetterGrade};
//!
//! let course_id = CourseId::generate();
//! assert!(course_id.as_str().starts_with("course_"));
//!
//! let outcome = compute_result(80.0, 90.0).unwrap();
//! assert_eq!(outcome.percentage, 86);
//! assert_eq!(outcome.grade, LetterGrade::A);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod envelope;
pub mod error;
pub mod grading;
pub mod ids;
pub mod role;

pub use envelope::{paginate, Envelope, ErrorBody, PageRequest, Pagination, DEFAULT_PAGE_SIZE};
pub use error::{CoreError, Result};
pub use grading::{compute_result, GradeError, GradeOutcome, LetterGrade, PASS_MARK};
pub use ids::{
    AssignmentId, CourseId, EnrollmentId, IdError, MaterialId, ResultId, SubmissionId, UserId,
};
pub use role::Role;
