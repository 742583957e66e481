//! Handlers and request routing for the LMS.
//!
//! This crate holds the business rules for every LMS operation: auth,
//! courses, users, enrollments, assignments and submissions, materials,
//! results and dashboard aggregation. The HTTP gateway and the in-process
//! [`Dispatcher`] both call into the same [`Lms`] implementation, so the two
//! variants answer with identical envelopes.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────┐     ┌───────────────────────┐
//! │   Gateway (axum)      │     │  Dispatcher (in-proc) │
//! └───────────────────────┘     └───────────────────────┘
//!             │                   Route::resolve │
//!             └──────────────┬───────────────────┘
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       LmsService                            │
//! │  ┌──────┐ ┌─────────┐ ┌───────┐ ┌─────────────┐ ┌─────────┐ │
//! │  │ Auth │ │ Courses │ │ Users │ │ Enrollments │ │ Results │ │
//! │  └──────┘ └─────────┘ └───────┘ └─────────────┘ └─────────┘ │
//! │  ┌─────────────┐ ┌───────────┐ ┌───────────┐                │
//! │  │ Assignments │ │ Materials │ │ Dashboard │                │
//! │  └─────────────┘ └───────────┘ └───────────┘                │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!               ┌────────────┴────────────┐
//!               ▼                         ▼
//!        ┌─────────────┐          ┌──────────────┐
//!        │    Store    │          │     Auth     │
//!        │  (memory)   │          │ (JWT/bcrypt) │
//!        └─────────────┘          └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use lms_auth::{AuthConfig, HmacTokens};
//! use lms_service::{Lms, LmsService, LoginRequest};
//! use lms_store::MemoryStore;
//! use lms_core::Role;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::with_demo_data());
//! let tokens = Arc::new(HmacTokens::new(AuthConfig::default()));
//! let lms = LmsService::with_defaults(store, tokens);
//!
//! let session = lms
//!     .login(LoginRequest {
//!         email: "student@university.edu".into(),
//!         password: "password123".into(),
//!         role: Role::Student,
//!     })
//!     .await?;
//! println!("logged in as {}", session.user.first_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Snapshots
//!
//! Courses, enrollments, submissions and results embed copies of the users
//! and courses they refer to. Editing a user later does not rewrite those
//! copies.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod dispatch;
pub mod enrollments;
pub mod error;
pub mod materials;
pub mod results;
pub mod router;
pub mod service;
pub mod types;
pub mod users;

pub use dispatch::{ApiRequest, Body, Dispatcher};
pub use error::{LmsError, Result};
pub use router::Route;
pub use service::{Lms, LmsService, Page};
pub use types::{
    AssignmentPatch, Caller, CoursePatch, CreateCourseRequest, CreateEnrollmentRequest,
    CreateUserRequest, EnrollmentPatch, FilePart, InstructorCourses, ListQuery, LoginRequest,
    LoginResponse, MaterialPatch, RegisterRequest, ResultPatch, ServiceConfig,
    SetPasswordRequest, StatusChange, SubmissionGrade, Upload, UpsertResultRequest, UserPatch,
    UserProfile,
};

// Re-export commonly used types from dependencies for convenience
pub use lms_core::{CourseId, Envelope, PageRequest, Pagination, Role, UserId};
pub use lms_store::{Course, Enrollment, MemoryStore, Store, User};
