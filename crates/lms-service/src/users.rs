//! User administration.
//!
//! Unlike registration, direct creation does not check email uniqueness.

use chrono::Utc;
use lms_auth::{hash_password, AuthConfig};
use lms_core::{paginate, CourseId, PageRequest, Pagination, Role, UserId};
use lms_store::{Course, Store, User};

use crate::auth::next_number;
use crate::courses::instructor_snapshot;
use crate::error::{or_missing, LmsError, Result};
use crate::types::{CreateUserRequest, UserPatch};

/// List users, optionally filtered by role.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list<S: Store>(
    store: &S,
    role: Option<Role>,
    page: PageRequest,
) -> Result<(Vec<User>, Pagination)> {
    let mut users = store.list_users()?;
    if let Some(role) = role {
        users.retain(|u| u.role == role);
    }
    Ok(paginate(users, page))
}

/// All student accounts.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn students<S: Store>(store: &S) -> Result<Vec<User>> {
    let mut users = store.list_users()?;
    users.retain(|u| u.role == Role::Student);
    Ok(users)
}

/// Fetch one user.
///
/// # Errors
///
/// Returns `LmsError::UserNotFound` if the user does not exist.
pub fn get<S: Store>(store: &S, user_id: &UserId) -> Result<User> {
    store.get_user(user_id)?.ok_or(LmsError::UserNotFound)
}

/// Create a user. Role defaults to student.
///
/// # Errors
///
/// Returns `LmsError::Validation` for missing names or email, or a password
/// that fails the policy.
pub fn create<S: Store>(store: &S, config: &AuthConfig, request: CreateUserRequest) -> Result<User> {
    for (name, value) in [
        ("firstName", &request.first_name),
        ("lastName", &request.last_name),
        ("email", &request.email),
    ] {
        if value.trim().is_empty() {
            return Err(LmsError::validation(format!("{name} is required")));
        }
    }

    let password_hash = match &request.password {
        Some(password) => {
            config.password_policy().validate(password)?;
            Some(hash_password(password, config.bcrypt_cost)?)
        }
        None => None,
    };

    let role = request.role.unwrap_or(Role::Student);
    let users = store.list_users()?;
    let student_id = match role {
        Role::Student => request
            .student_id
            .or_else(|| Some(next_number(&users, Role::Student))),
        _ => request.student_id,
    };
    let instructor_id = match role {
        Role::Instructor => request
            .instructor_id
            .or_else(|| Some(next_number(&users, Role::Instructor))),
        _ => request.instructor_id,
    };

    let now = Utc::now();
    let user = User {
        id: UserId::generate(),
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone: request.phone,
        role,
        is_active: true,
        student_id,
        instructor_id,
        password_hash,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user)?;

    tracing::info!(user_id = %user.id, role = %user.role, "Created user");
    Ok(user)
}

/// Merge a patch into a user.
///
/// Course and enrollment snapshots of the user are not refreshed.
///
/// # Errors
///
/// Returns `LmsError::UserNotFound` if the user does not exist.
pub fn update<S: Store>(store: &S, user_id: &UserId, patch: UserPatch) -> Result<User> {
    let mut user = get(store, user_id)?;

    if let Some(first_name) = patch.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        user.last_name = last_name;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    if patch.phone.is_some() {
        user.phone = patch.phone;
    }
    if let Some(role) = patch.role {
        user.role = role;
    }
    if let Some(is_active) = patch.is_active {
        user.is_active = is_active;
    }
    if patch.student_id.is_some() {
        user.student_id = patch.student_id;
    }
    if patch.instructor_id.is_some() {
        user.instructor_id = patch.instructor_id;
    }
    user.updated_at = Utc::now();

    store
        .put_user(&user)
        .map_err(|e| or_missing(e, LmsError::UserNotFound))?;
    Ok(user)
}

/// Remove a user record.
///
/// # Errors
///
/// Returns `LmsError::UserNotFound` if the user does not exist.
pub fn delete<S: Store>(store: &S, user_id: &UserId) -> Result<()> {
    store
        .delete_user(user_id)
        .map_err(|e| or_missing(e, LmsError::UserNotFound))?;
    tracing::info!(user_id = %user_id, "Deleted user");
    Ok(())
}

/// Activate or deactivate an account.
///
/// # Errors
///
/// Returns `LmsError::UserNotFound` if the user does not exist.
pub fn set_status<S: Store>(store: &S, user_id: &UserId, is_active: bool) -> Result<User> {
    let user = update(
        store,
        user_id,
        UserPatch {
            is_active: Some(is_active),
            ..UserPatch::default()
        },
    )?;
    tracing::info!(user_id = %user_id, is_active, "Changed account status");
    Ok(user)
}

/// Make `course_ids` the exact set of courses an instructor teaches.
///
/// Listed courses get a fresh snapshot of the instructor. Courses the
/// instructor taught before but that are not listed lose their instructor.
/// Every listed course is resolved before anything is written.
///
/// # Errors
///
/// Returns `LmsError::UserNotFound` for an unknown user,
/// `LmsError::Validation` if the user is not an instructor and
/// `LmsError::CourseNotFound` if a listed course does not exist.
pub fn assign_instructor_courses<S: Store>(
    store: &S,
    user_id: &UserId,
    course_ids: &[CourseId],
) -> Result<Vec<Course>> {
    let instructor = instructor_snapshot(store, user_id)?;

    let courses = store.list_courses()?;
    if let Some(missing) = course_ids
        .iter()
        .find(|id| !courses.iter().any(|c| &c.id == *id))
    {
        tracing::debug!(course_id = %missing, "Unknown course in instructor assignment");
        return Err(LmsError::CourseNotFound);
    }

    let now = Utc::now();
    let mut assigned = Vec::with_capacity(course_ids.len());
    for mut course in courses {
        let listed = course_ids.contains(&course.id);
        if listed {
            course.instructor = Some(instructor.clone());
        } else if course.is_taught_by(user_id) {
            course.instructor = None;
        } else {
            continue;
        }
        course.updated_at = now;
        let stored = store.put_course(&course)?;
        if listed {
            assigned.push(stored);
        }
    }

    tracing::info!(
        user_id = %user_id,
        courses = assigned.len(),
        "Assigned instructor courses"
    );
    Ok(assigned)
}
