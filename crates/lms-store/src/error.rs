//! Error types for the storage layer.

use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("record not found")]
    NotFound,

    /// A record with the same identifier already exists.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// The student already holds a non-dropped enrollment in the course.
    #[error("student already enrolled in course")]
    DuplicateEnrollment,

    /// The course has no free seats.
    #[error("course capacity reached")]
    CapacityReached,
}
