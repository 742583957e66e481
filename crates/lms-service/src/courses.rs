//! Course operations.

use chrono::Utc;
use lms_core::{paginate, CourseId, PageRequest, Pagination, Role, UserId};
use lms_store::{Course, CourseLevel, CourseStatus, InstructorSummary, Store};

use crate::error::{or_missing, LmsError, Result};
use crate::types::{Caller, CoursePatch, CreateCourseRequest};

/// List all courses, one page at a time.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list<S: Store>(store: &S, page: PageRequest) -> Result<(Vec<Course>, Pagination)> {
    Ok(paginate(store.list_courses()?, page))
}

/// Courses open for enrollment.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn available<S: Store>(store: &S) -> Result<Vec<Course>> {
    let mut courses = store.list_courses()?;
    courses.retain(|c| c.status == CourseStatus::Active);
    Ok(courses)
}

/// Courses whose instructor snapshot names the caller.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn by_instructor<S: Store>(store: &S, caller: &Caller) -> Result<Vec<Course>> {
    let mut courses = store.list_courses()?;
    courses.retain(|c| c.is_taught_by(&caller.user_id));
    Ok(courses)
}

/// Fetch one course.
///
/// # Errors
///
/// Returns `LmsError::CourseNotFound` if the course does not exist.
pub fn get<S: Store>(store: &S, course_id: &CourseId) -> Result<Course> {
    store.get_course(course_id)?.ok_or(LmsError::CourseNotFound)
}

/// Resolve a user id to an instructor snapshot.
pub(crate) fn instructor_snapshot<S: Store>(
    store: &S,
    user_id: &UserId,
) -> Result<InstructorSummary> {
    let user = store.get_user(user_id)?.ok_or(LmsError::UserNotFound)?;
    if user.role != Role::Instructor {
        return Err(LmsError::validation(format!(
            "User {user_id} is not an instructor"
        )));
    }
    Ok(user.instructor_summary())
}

/// Create a course.
///
/// The instructor is `instructorId` from the payload, or the caller when the
/// caller is an instructor.
///
/// # Errors
///
/// Returns `LmsError::Validation` if title, code or instructor is missing,
/// and `LmsError::UserNotFound` if the instructor does not resolve.
pub fn create<S: Store>(store: &S, caller: &Caller, request: CreateCourseRequest) -> Result<Course> {
    if request.title.trim().is_empty() {
        return Err(LmsError::validation("title is required"));
    }
    if request.code.trim().is_empty() {
        return Err(LmsError::validation("code is required"));
    }

    let instructor_id = match (request.instructor_id, caller.role) {
        (Some(id), _) => id,
        (None, Role::Instructor) => caller.user_id.clone(),
        (None, _) => return Err(LmsError::validation("instructorId is required")),
    };
    let instructor = instructor_snapshot(store, &instructor_id)?;

    let now = Utc::now();
    let course = Course {
        id: CourseId::generate(),
        title: request.title,
        code: request.code,
        description: request.description,
        instructor: Some(instructor),
        capacity: request.capacity,
        enrolled: 0,
        duration: request.duration,
        credits: request.credits.unwrap_or(3),
        level: request.level.unwrap_or(CourseLevel::Beginner),
        category: request.category.unwrap_or_else(|| "General".to_string()),
        status: CourseStatus::Active,
        start_date: request.start_date,
        end_date: request.end_date,
        created_at: now,
        updated_at: now,
    };
    store.insert_course(&course)?;

    tracing::info!(course_id = %course.id, code = %course.code, "Created course");
    Ok(course)
}

/// Merge a patch into a course.
///
/// # Errors
///
/// Returns `LmsError::CourseNotFound` if the course does not exist.
pub fn update<S: Store>(store: &S, course_id: &CourseId, patch: CoursePatch) -> Result<Course> {
    let mut course = get(store, course_id)?;

    if let Some(instructor_id) = &patch.instructor_id {
        course.instructor = Some(instructor_snapshot(store, instructor_id)?);
    }
    if let Some(title) = patch.title {
        course.title = title;
    }
    if let Some(code) = patch.code {
        course.code = code;
    }
    if let Some(description) = patch.description {
        course.description = description;
    }
    if let Some(capacity) = patch.capacity {
        course.capacity = capacity;
    }
    if let Some(duration) = patch.duration {
        course.duration = duration;
    }
    if let Some(credits) = patch.credits {
        course.credits = credits;
    }
    if let Some(level) = patch.level {
        course.level = level;
    }
    if let Some(category) = patch.category {
        course.category = category;
    }
    if let Some(status) = patch.status {
        course.status = status;
    }
    if patch.start_date.is_some() {
        course.start_date = patch.start_date;
    }
    if patch.end_date.is_some() {
        course.end_date = patch.end_date;
    }
    course.updated_at = Utc::now();

    store
        .put_course(&course)
        .map_err(|e| or_missing(e, LmsError::CourseNotFound))
}

/// Delete a course.
///
/// Enrollments, assignments and materials that reference the course are
/// left in place.
///
/// # Errors
///
/// Returns `LmsError::CourseNotFound` if the course does not exist.
pub fn delete<S: Store>(store: &S, course_id: &CourseId) -> Result<()> {
    store
        .delete_course(course_id)
        .map_err(|e| or_missing(e, LmsError::CourseNotFound))?;

    let enrollments = store
        .list_enrollments()?
        .iter()
        .filter(|e| &e.course.id == course_id)
        .count();
    let assignments = store
        .list_assignments()?
        .iter()
        .filter(|a| &a.course.id == course_id)
        .count();
    let materials = store
        .list_materials()?
        .iter()
        .filter(|m| &m.course.id == course_id)
        .count();

    if enrollments + assignments + materials > 0 {
        tracing::warn!(
            course_id = %course_id,
            enrollments,
            assignments,
            materials,
            "Deleted course still referenced"
        );
    } else {
        tracing::info!(course_id = %course_id, "Deleted course");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_store::MemoryStore;

    fn admin() -> Caller {
        Caller::new(UserId::new("admin1").unwrap(), Role::Admin)
    }

    fn sarah() -> Caller {
        Caller::new(UserId::new("instructor1").unwrap(), Role::Instructor)
    }

    fn request(title: &str, instructor: Option<&str>) -> CreateCourseRequest {
        CreateCourseRequest {
            title: title.to_string(),
            code: "OS301".to_string(),
            description: "Processes, memory, file systems".to_string(),
            instructor_id: instructor.map(|id| UserId::new(id).unwrap()),
            capacity: 20,
            duration: "12 weeks".to_string(),
            credits: None,
            level: None,
            category: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn create_update_list_delete_round_trip() {
        let store = MemoryStore::with_demo_data();
        let course = create(&store, &admin(), request("Operating Systems", Some("instructor2"))).unwrap();
        assert_eq!(course.enrolled, 0);
        assert_eq!(course.credits, 3);
        assert_eq!(course.category, "General");
        assert_eq!(course.instructor.as_ref().unwrap().first_name, "Prof. Michael");

        update(
            &store,
            &course.id,
            CoursePatch {
                title: Some("X".into()),
                ..CoursePatch::default()
            },
        )
        .unwrap();

        let (courses, pagination) = list(&store, PageRequest::default()).unwrap();
        assert_eq!(pagination.total, 6);
        assert_eq!(courses.iter().filter(|c| c.id == course.id).count(), 1);
        assert_eq!(courses.iter().find(|c| c.id == course.id).unwrap().title, "X");

        delete(&store, &course.id).unwrap();
        let (courses, _) = list(&store, PageRequest::default()).unwrap();
        assert!(courses.iter().all(|c| c.id != course.id));
    }

    #[test]
    fn create_defaults_to_calling_instructor() {
        let store = MemoryStore::with_demo_data();
        let course = create(&store, &sarah(), request("Compilers", None)).unwrap();
        assert!(course.is_taught_by(&sarah().user_id));

        let mine = by_instructor(&store, &sarah()).unwrap();
        assert_eq!(mine.len(), 4);
    }

    #[test]
    fn create_validates_payload() {
        let store = MemoryStore::with_demo_data();
        assert!(matches!(
            create(&store, &admin(), request("", Some("instructor1"))),
            Err(LmsError::Validation(_))
        ));
        assert!(matches!(
            create(&store, &admin(), request("Compilers", None)),
            Err(LmsError::Validation(_))
        ));
        assert!(matches!(
            create(&store, &admin(), request("Compilers", Some("ghost"))),
            Err(LmsError::UserNotFound)
        ));
        assert!(matches!(
            create(&store, &admin(), request("Compilers", Some("student1"))),
            Err(LmsError::Validation(_))
        ));
    }

    #[test]
    fn missing_course_errors() {
        let store = MemoryStore::with_demo_data();
        let ghost = CourseId::new("ghost").unwrap();
        assert!(matches!(get(&store, &ghost), Err(LmsError::CourseNotFound)));
        assert!(matches!(
            update(&store, &ghost, CoursePatch::default()),
            Err(LmsError::CourseNotFound)
        ));
        assert!(matches!(delete(&store, &ghost), Err(LmsError::CourseNotFound)));
    }

    #[test]
    fn delete_does_not_cascade() {
        let store = MemoryStore::with_demo_data();
        let cs101 = CourseId::new("course1").unwrap();
        delete(&store, &cs101).unwrap();
        assert!(store
            .list_enrollments()
            .unwrap()
            .iter()
            .any(|e| e.course.id == cs101));
    }

    #[test]
    fn available_filters_on_status() {
        let store = MemoryStore::with_demo_data();
        update(
            &store,
            &CourseId::new("course5").unwrap(),
            CoursePatch {
                status: Some(CourseStatus::Archived),
                ..CoursePatch::default()
            },
        )
        .unwrap();
        let open = available(&store).unwrap();
        assert_eq!(open.len(), 4);
        assert!(open.iter().all(|c| c.status == CourseStatus::Active));
    }

    #[test]
    fn instructor_snapshot_is_not_live() {
        let store = MemoryStore::with_demo_data();
        let mut sarah = store.get_user(&UserId::new("instructor1").unwrap()).unwrap().unwrap();
        sarah.last_name = "Renamed".into();
        store.put_user(&sarah).unwrap();

        let course = get(&store, &CourseId::new("course1").unwrap()).unwrap();
        assert_eq!(course.instructor.unwrap().last_name, "Johnson");
    }
}
