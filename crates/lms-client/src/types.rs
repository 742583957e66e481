//! Response types for the gateway client.
//!
//! These mirror the wire shapes the gateway answers with. Fields the client
//! never reads are kept in `extra` so nothing is lost when a value is
//! printed or stored again.

use lms_core::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Auth
// =============================================================================

/// The user projection returned by login and `me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account email.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Everything else the server sent (student number, staff number).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
    /// Portal being logged into.
    pub role: Role,
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
// Courses and enrollments
// =============================================================================

/// A course as listed by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Course title.
    pub title: String,
    /// Short code such as `CS101`.
    pub code: String,
    /// Seat count.
    #[serde(default)]
    pub capacity: u32,
    /// Seats taken.
    #[serde(default)]
    pub enrolled: u32,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The course snapshot embedded in an enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRef {
    /// Course identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Course title.
    pub title: String,
    /// Short code.
    pub code: String,
}

/// A student's seat in a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Enrollment identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// The course at enrollment time.
    pub course: CourseRef,
    /// Enrollment status.
    pub status: String,
    /// Completion percentage.
    #[serde(default)]
    pub progress: u32,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Enrollment request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest<'a> {
    /// Course to enroll in.
    pub course_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_keeps_unknown_fields() {
        let profile: UserProfile = serde_json::from_value(json!({
            "_id": "student1",
            "firstName": "John",
            "lastName": "Doe",
            "email": "student@university.edu",
            "role": "student",
            "studentId": "STU001"
        }))
        .unwrap();

        assert_eq!(profile.role, Role::Student);
        assert_eq!(profile.full_name(), "John Doe");
        assert_eq!(profile.extra["studentId"], "STU001");

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["studentId"], "STU001");
        assert_eq!(back["_id"], "student1");
    }
}
