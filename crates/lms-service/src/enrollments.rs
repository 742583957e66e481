//! Enrollment operations.
//!
//! The course's `enrolled` counter is maintained by the store together with
//! the enrollment record, so handlers never write it directly.

use chrono::Utc;
use lms_core::{paginate, CourseId, EnrollmentId, PageRequest, Pagination, UserId};
use lms_store::{Enrollment, EnrollmentStatus, Store};

use crate::error::{enrollment_conflict, or_missing, LmsError, Result};
use crate::types::{Caller, CreateEnrollmentRequest, EnrollmentPatch};

/// List all enrollments.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list<S: Store>(store: &S, page: PageRequest) -> Result<(Vec<Enrollment>, Pagination)> {
    Ok(paginate(store.list_enrollments()?, page))
}

/// Enroll a student in a course.
///
/// The student defaults to the caller.
///
/// # Errors
///
/// In order: `LmsError::CourseNotFound` if the course does not resolve,
/// `LmsError::UserNotFound` if the student does not resolve,
/// `LmsError::AlreadyEnrolled` if the student holds a non-dropped enrollment
/// in the course, and `LmsError::CourseFull` if no seat is free. A failed
/// call writes nothing.
pub fn create<S: Store>(
    store: &S,
    caller: &Caller,
    request: CreateEnrollmentRequest,
) -> Result<Enrollment> {
    let course = store
        .get_course(&request.course_id)?
        .ok_or(LmsError::CourseNotFound)?;

    let student_id = request
        .student_id
        .unwrap_or_else(|| caller.user_id.clone());
    let student = store
        .get_user(&student_id)?
        .ok_or(LmsError::UserNotFound)?;

    let now = Utc::now();
    let enrollment = Enrollment {
        id: EnrollmentId::generate(),
        student: student.student_summary(),
        course: course.summary(),
        status: EnrollmentStatus::Active,
        progress: 0,
        enrollment_date: now,
        grade: None,
        score: None,
        created_at: now,
        updated_at: now,
    };

    let course = store.enroll(&enrollment).map_err(enrollment_conflict)?;

    tracing::info!(
        enrollment_id = %enrollment.id,
        student_id = %student.id,
        course_id = %course.id,
        enrolled = course.enrolled,
        "Enrolled student"
    );
    Ok(enrollment)
}

/// The caller's own enrollments.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn for_student<S: Store>(store: &S, caller: &Caller) -> Result<Vec<Enrollment>> {
    let mut enrollments = store.list_enrollments()?;
    enrollments.retain(|e| e.student.id == caller.user_id);
    Ok(enrollments)
}

/// Courses the user holds a non-dropped enrollment in.
pub(crate) fn enrolled_course_ids<S: Store>(store: &S, user_id: &UserId) -> Result<Vec<CourseId>> {
    Ok(store
        .list_enrollments()?
        .into_iter()
        .filter(|e| &e.student.id == user_id && e.status.occupies_seat())
        .map(|e| e.course.id)
        .collect())
}

/// Change status, progress or grade.
///
/// Any status may follow any other.
///
/// # Errors
///
/// Returns `LmsError::EnrollmentNotFound` if the enrollment does not exist
/// and `LmsError::Validation` for progress above 100.
pub fn update<S: Store>(
    store: &S,
    enrollment_id: &EnrollmentId,
    patch: EnrollmentPatch,
) -> Result<Enrollment> {
    let mut enrollment = store
        .get_enrollment(enrollment_id)?
        .ok_or(LmsError::EnrollmentNotFound)?;

    if let Some(progress) = patch.progress {
        if progress > 100 {
            return Err(LmsError::validation("progress must be between 0 and 100"));
        }
        enrollment.progress = progress;
    }
    if let Some(status) = patch.status {
        enrollment.status = status;
    }
    if patch.grade.is_some() {
        enrollment.grade = patch.grade;
    }
    if patch.score.is_some() {
        enrollment.score = patch.score;
    }
    enrollment.updated_at = Utc::now();

    store
        .put_enrollment(&enrollment)
        .map_err(|e| or_missing(e, LmsError::EnrollmentNotFound))?;
    Ok(enrollment)
}

/// Remove an enrollment, freeing its seat.
///
/// # Errors
///
/// Returns `LmsError::EnrollmentNotFound` if the enrollment does not exist.
pub fn delete<S: Store>(store: &S, enrollment_id: &EnrollmentId) -> Result<()> {
    store
        .delete_enrollment(enrollment_id)
        .map_err(|e| or_missing(e, LmsError::EnrollmentNotFound))?;
    tracing::info!(enrollment_id = %enrollment_id, "Deleted enrollment");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CoursePatch;
    use lms_core::Role;
    use lms_store::MemoryStore;

    fn student(id: &str) -> Caller {
        Caller::new(UserId::new(id).unwrap(), Role::Student)
    }

    fn enroll_in(course: &str) -> CreateEnrollmentRequest {
        CreateEnrollmentRequest {
            course_id: CourseId::new(course).unwrap(),
            student_id: None,
        }
    }

    fn seats(store: &MemoryStore, course: &str) -> u32 {
        store
            .get_course(&CourseId::new(course).unwrap())
            .unwrap()
            .unwrap()
            .enrolled
    }

    #[test]
    fn create_takes_a_seat() {
        let store = MemoryStore::with_demo_data();
        let before = seats(&store, "course4");

        let enrollment = create(&store, &student("student3"), enroll_in("course4")).unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Active);
        assert_eq!(enrollment.progress, 0);
        assert_eq!(enrollment.student.first_name, "Alex");
        assert_eq!(enrollment.course.code, "DB201");
        assert_eq!(seats(&store, "course4"), before + 1);
    }

    #[test]
    fn seat_counter_survives_concurrent_course_writes() {
        const STUDENTS: usize = 400;

        let store = MemoryStore::with_demo_data();
        let course_id = CourseId::new("course4").unwrap();
        let widen = CoursePatch {
            capacity: Some(1_000_000),
            ..CoursePatch::default()
        };
        crate::courses::update(&store, &course_id, widen).unwrap();
        let before = seats(&store, "course4");

        let template = store.get_user(&UserId::new("student1").unwrap()).unwrap().unwrap();
        let students: Vec<_> = (0..STUDENTS)
            .map(|i| {
                let mut user = template.clone();
                user.id = UserId::new(format!("load{i}")).unwrap();
                user.email = format!("load{i}@university.edu");
                store.insert_user(&user).unwrap();
                student(user.id.as_str())
            })
            .collect();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for caller in &students {
                    create(&store, caller, enroll_in("course4")).unwrap();
                }
            });
            scope.spawn(|| {
                for i in 0..STUDENTS {
                    let patch = CoursePatch {
                        title: Some(format!("Database Systems {i}")),
                        ..CoursePatch::default()
                    };
                    crate::courses::update(&store, &course_id, patch).unwrap();
                }
            });
            scope.spawn(|| {
                for i in 0..STUDENTS {
                    let instructor = if i % 2 == 0 { "instructor1" } else { "instructor2" };
                    crate::users::assign_instructor_courses(
                        &store,
                        &UserId::new(instructor).unwrap(),
                        &[course_id.clone()],
                    )
                    .unwrap();
                }
            });
        });

        let held = store
            .list_enrollments()
            .unwrap()
            .iter()
            .filter(|e| e.course.id == course_id && e.status != EnrollmentStatus::Dropped)
            .count();
        assert_eq!(seats(&store, "course4") as usize, before as usize + STUDENTS);
        assert_eq!(seats(&store, "course4") as usize, held);
    }

    #[test]
    fn full_course_is_rejected_without_writes() {
        let store = MemoryStore::with_demo_data();
        let mut course = store.get_course(&CourseId::new("course5").unwrap()).unwrap().unwrap();
        course.capacity = course.enrolled;
        store.put_course(&course).unwrap();
        let before = store.list_enrollments().unwrap().len();

        let result = create(&store, &student("student4"), enroll_in("course5"));
        assert!(matches!(result, Err(LmsError::CourseFull)));
        assert_eq!(store.get_course(&course.id).unwrap().unwrap(), course);
        assert_eq!(store.list_enrollments().unwrap().len(), before);
    }

    #[test]
    fn second_enrollment_is_rejected() {
        let store = MemoryStore::with_demo_data();
        create(&store, &student("student4"), enroll_in("course2")).unwrap();
        let again = create(&store, &student("student4"), enroll_in("course2"));
        assert!(matches!(again, Err(LmsError::AlreadyEnrolled)));

        let pairs = store
            .list_enrollments()
            .unwrap()
            .into_iter()
            .filter(|e| e.student.id.as_str() == "student4" && e.course.id.as_str() == "course2")
            .count();
        assert_eq!(pairs, 1);
    }

    #[test]
    fn unknown_course_or_student() {
        let store = MemoryStore::with_demo_data();
        assert!(matches!(
            create(&store, &student("student1"), enroll_in("ghost")),
            Err(LmsError::CourseNotFound)
        ));
        assert!(matches!(
            create(&store, &student("ghost"), enroll_in("course1")),
            Err(LmsError::UserNotFound)
        ));
    }

    #[test]
    fn admin_enrolls_someone_else() {
        let store = MemoryStore::with_demo_data();
        let admin = Caller::new(UserId::new("admin1").unwrap(), Role::Admin);
        let enrollment = create(
            &store,
            &admin,
            CreateEnrollmentRequest {
                course_id: CourseId::new("course3").unwrap(),
                student_id: Some(UserId::new("student5").unwrap()),
            },
        )
        .unwrap();
        assert_eq!(enrollment.student.id.as_str(), "student5");
    }

    #[test]
    fn for_student_filters_on_caller() {
        let store = MemoryStore::with_demo_data();
        let mine = for_student(&store, &student("student1")).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|e| e.student.id.as_str() == "student1"));
    }

    #[test]
    fn dropping_frees_the_seat() {
        let store = MemoryStore::with_demo_data();
        let before = seats(&store, "course1");
        let id = EnrollmentId::new("enrollment1").unwrap();

        let dropped = update(
            &store,
            &id,
            EnrollmentPatch {
                status: Some(EnrollmentStatus::Dropped),
                ..EnrollmentPatch::default()
            },
        )
        .unwrap();
        assert_eq!(dropped.status, EnrollmentStatus::Dropped);
        assert_eq!(seats(&store, "course1"), before - 1);

        // Any status may follow any other.
        update(
            &store,
            &id,
            EnrollmentPatch {
                status: Some(EnrollmentStatus::Completed),
                progress: Some(100),
                ..EnrollmentPatch::default()
            },
        )
        .unwrap();
        assert_eq!(seats(&store, "course1"), before);
    }

    #[test]
    fn update_and_delete_errors() {
        let store = MemoryStore::with_demo_data();
        let ghost = EnrollmentId::new("ghost").unwrap();
        assert!(matches!(
            update(&store, &ghost, EnrollmentPatch::default()),
            Err(LmsError::EnrollmentNotFound)
        ));
        assert!(matches!(delete(&store, &ghost), Err(LmsError::EnrollmentNotFound)));

        let too_far = update(
            &store,
            &EnrollmentId::new("enrollment2").unwrap(),
            EnrollmentPatch {
                progress: Some(101),
                ..EnrollmentPatch::default()
            },
        );
        assert!(matches!(too_far, Err(LmsError::Validation(_))));
    }

    #[test]
    fn delete_frees_the_seat() {
        let store = MemoryStore::with_demo_data();
        let before = seats(&store, "course2");
        delete(&store, &EnrollmentId::new("enrollment5").unwrap()).unwrap();
        assert_eq!(seats(&store, "course2"), before - 1);
    }
}
