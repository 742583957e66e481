//! Entity store for the LMS.
//!
//! This crate owns every domain record: users, courses, enrollments,
//! assignments with their submissions, materials and results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────────────────────────┐
//! │  lms-service │────►│ Store (trait)                       │
//! └──────────────┘     │  └── MemoryStore                    │
//!                      │        RwLock<Tables>               │
//!                      │          users, courses, ...        │
//!                      └─────────────────────────────────────┘
//! ```
//!
//! Tables are ordered sequences: listing returns records in insertion
//! order, which the dashboard relies on for recency.
//!
//! # Example
//!
//! ```
//! use lms_store::{MemoryStore, Store};
//! use lms_core::CourseId;
//!
//! let store = MemoryStore::with_demo_data();
//! let course = store.get_course(&CourseId::new("course1").unwrap()).unwrap().unwrap();
//! assert_eq!(course.code, "CS101");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod seed;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use types::{
    Assignment, AssignmentStatus, AuthorSummary, Course, CourseLevel, CourseResult, CourseStatus,
    CourseSummary, Enrollment, EnrollmentStatus, FileMeta, FileType, InstructorSummary, Material,
    ResultStatus, Role, StudentSummary, Submission, SubmissionStatus, User,
};

use lms_core::{
    AssignmentId, CourseId, EnrollmentId, MaterialId, ResultId, SubmissionId, UserId,
};

/// The storage trait defining all entity operations.
///
/// `insert_*` appends a new record and fails with [`StoreError::Duplicate`]
/// if the identifier is taken. `put_*` replaces an existing record and fails
/// with [`StoreError::NotFound`] if there is none. `list_*` returns records
/// in insertion order.
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the id is taken.
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Replace an existing user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Find a user by exact, case-sensitive email.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Remove a user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn delete_user(&self, user_id: &UserId) -> Result<()>;

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_users(&self) -> Result<Vec<User>>;

    // =========================================================================
    // Course Operations
    // =========================================================================

    /// Insert a new course.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the id is taken.
    fn insert_course(&self, course: &Course) -> Result<()>;

    /// Replace an existing course, returning the stored row.
    ///
    /// The seat counter belongs to the store: `enrolled` on the argument is
    /// ignored and the stored value is kept. Only [`Store::enroll`],
    /// [`Store::put_enrollment`] and [`Store::delete_enrollment`] move it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the course doesn't exist.
    fn put_course(&self, course: &Course) -> Result<Course>;

    /// Get a course by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_course(&self, course_id: &CourseId) -> Result<Option<Course>>;

    /// Remove a course. Dependent records are left in place.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the course doesn't exist.
    fn delete_course(&self, course_id: &CourseId) -> Result<()>;

    /// List all courses.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_courses(&self) -> Result<Vec<Course>>;

    // =========================================================================
    // Enrollment Operations
    // =========================================================================

    /// Insert an enrollment and take a seat in its course, atomically.
    ///
    /// Checks, in order: the course exists, the student has no non-dropped
    /// enrollment in it, and a seat is free. Returns the updated course.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the course doesn't exist,
    /// `StoreError::DuplicateEnrollment` or `StoreError::CapacityReached`
    /// if the checks fail. Nothing is written on failure.
    fn enroll(&self, enrollment: &Enrollment) -> Result<Course>;

    /// Replace an existing enrollment.
    ///
    /// Moving into `dropped` frees a seat in the course and moving out of it
    /// takes one again.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the enrollment doesn't exist.
    fn put_enrollment(&self, enrollment: &Enrollment) -> Result<()>;

    /// Get an enrollment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_enrollment(&self, enrollment_id: &EnrollmentId) -> Result<Option<Enrollment>>;

    /// Remove an enrollment, freeing its seat if it held one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the enrollment doesn't exist.
    fn delete_enrollment(&self, enrollment_id: &EnrollmentId) -> Result<()>;

    /// List all enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_enrollments(&self) -> Result<Vec<Enrollment>>;

    // =========================================================================
    // Assignment Operations
    // =========================================================================

    /// Insert a new assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the id is taken.
    fn insert_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// Replace an existing assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the assignment doesn't exist.
    fn put_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// Get an assignment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_assignment(&self, assignment_id: &AssignmentId) -> Result<Option<Assignment>>;

    /// Remove an assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the assignment doesn't exist.
    fn delete_assignment(&self, assignment_id: &AssignmentId) -> Result<()>;

    /// List all assignments.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_assignments(&self) -> Result<Vec<Assignment>>;

    // =========================================================================
    // Submission Operations
    // =========================================================================

    /// Insert a new submission.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the id is taken.
    fn insert_submission(&self, submission: &Submission) -> Result<()>;

    /// Replace an existing submission.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the submission doesn't exist.
    fn put_submission(&self, submission: &Submission) -> Result<()>;

    /// Get a submission by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_submission(&self, submission_id: &SubmissionId) -> Result<Option<Submission>>;

    /// Remove a submission.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the submission doesn't exist.
    fn delete_submission(&self, submission_id: &SubmissionId) -> Result<()>;

    /// List all submissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_submissions(&self) -> Result<Vec<Submission>>;

    // =========================================================================
    // Material Operations
    // =========================================================================

    /// Insert a new material.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the id is taken.
    fn insert_material(&self, material: &Material) -> Result<()>;

    /// Replace an existing material.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the material doesn't exist.
    fn put_material(&self, material: &Material) -> Result<()>;

    /// Get a material by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_material(&self, material_id: &MaterialId) -> Result<Option<Material>>;

    /// Remove a material.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the material doesn't exist.
    fn delete_material(&self, material_id: &MaterialId) -> Result<()>;

    /// List all materials.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_materials(&self) -> Result<Vec<Material>>;

    // =========================================================================
    // Result Operations
    // =========================================================================

    /// Insert a new result.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the id is taken.
    fn insert_result(&self, result: &CourseResult) -> Result<()>;

    /// Replace an existing result.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the result doesn't exist.
    fn put_result(&self, result: &CourseResult) -> Result<()>;

    /// Get a result by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_result(&self, result_id: &ResultId) -> Result<Option<CourseResult>>;

    /// Remove a result.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the result doesn't exist.
    fn delete_result(&self, result_id: &ResultId) -> Result<()>;

    /// List all results.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_results(&self) -> Result<Vec<CourseResult>>;
}
