//! HTTP client for the LMS gateway.
//!
//! This crate provides:
//!
//! - [`LmsClient`], a typed reqwest client that attaches the stored bearer
//!   token and normalizes failure envelopes into [`ClientError::Api`]
//! - [`CredentialStore`] with in-memory and JSON-file implementations
//! - The `lmsctl` command-line tool
//!
//! # Example
//!
//! ```no_run
//! use lms_client::LmsClient;
//! use lms_core::Role;
//!
//! # async fn example() -> Result<(), lms_client::ClientError> {
//! let client = LmsClient::new("http://localhost:5000");
//! client.login("student@university.edu", "password123", Role::Student).await?;
//!
//! for enrollment in client.my_enrollments().await? {
//!     println!("{} {}", enrollment.course.code, enrollment.status);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod credentials;
pub mod error;
pub mod types;

pub use client::{FileUpload, LmsClient};
pub use credentials::{CredentialStore, Credentials, FileCredentials, MemoryCredentials};
pub use error::{ClientError, Result};
pub use types::{Course, Enrollment, LoginResponse, UserProfile};
