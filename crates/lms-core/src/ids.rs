//! Core identifier types for the LMS.
//!
//! Every entity collection has its own identifier newtype so that a course
//! identifier can never be passed where an enrollment identifier is expected.
//! Identifiers are opaque strings on the wire. Freshly created records get a
//! `<prefix>_<uuid>` identifier, which stays unique across deletions and
//! concurrent creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Prefix used for generated identifiers.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new unique identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", Self::PREFIX, uuid::Uuid::new_v4().simple()))
            }

            /// Create an identifier from an existing string.
            ///
            /// # Errors
            ///
            /// Returns [`IdError::Empty`] if the string is empty or only whitespace.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(IdError::Empty);
                }
                Ok(Self(value))
            }

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a user account (admin, instructor or student).
    UserId,
    "user"
);

string_id!(
    /// Identifier of a course.
    CourseId,
    "course"
);

string_id!(
    /// Identifier of an enrollment of a student in a course.
    EnrollmentId,
    "enrollment"
);

string_id!(
    /// Identifier of an assignment.
    AssignmentId,
    "assignment"
);

string_id!(
    /// Identifier of a submission to an assignment.
    SubmissionId,
    "submission"
);

string_id!(
    /// Identifier of a course material.
    MaterialId,
    "material"
);

string_id!(
    /// Identifier of a course result.
    ResultId,
    "result"
);

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input string is empty.
    #[error("identifier must not be empty")]
    Empty,
}
