//! In-memory storage implementation.
//!
//! This module provides the `MemoryStore` implementation of the `Store` trait.
//! All tables sit behind a single `RwLock`, so every trait call observes and
//! produces a consistent snapshot. Enrollment writes update the course seat
//! counter under the same write guard.

use parking_lot::RwLock;

use lms_core::{AssignmentId, CourseId, EnrollmentId, MaterialId, ResultId, SubmissionId, UserId};

use crate::error::{Result, StoreError};
use crate::seed::Dataset;
use crate::types::{Assignment, Course, CourseResult, Enrollment, Material, Submission, User};
use crate::Store;

/// A record addressable by identifier.
trait Record: Clone {
    type Id: PartialEq + std::fmt::Display;

    fn id(&self) -> &Self::Id;
}

macro_rules! record {
    ($ty:ty, $id:ty) => {
        impl Record for $ty {
            type Id = $id;

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}

record!(User, UserId);
record!(Course, CourseId);
record!(Enrollment, EnrollmentId);
record!(Assignment, AssignmentId);
record!(Submission, SubmissionId);
record!(Material, MaterialId);
record!(CourseResult, ResultId);

/// An insertion-ordered collection of records.
struct Table<T> {
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Table<T> {
    fn from_rows(rows: Vec<T>) -> Self {
        Self { rows }
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    fn get(&self, id: &T::Id) -> Option<T> {
        self.rows.iter().find(|row| row.id() == id).cloned()
    }

    fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.rows.iter_mut().find(|row| row.id() == id)
    }

    fn insert(&mut self, row: &T) -> Result<()> {
        if self.position(row.id()).is_some() {
            return Err(StoreError::Duplicate(row.id().to_string()));
        }
        self.rows.push(row.clone());
        Ok(())
    }

    /// Replace in place, returning the previous version.
    fn replace(&mut self, row: &T) -> Result<T> {
        let index = self.position(row.id()).ok_or(StoreError::NotFound)?;
        Ok(std::mem::replace(&mut self.rows[index], row.clone()))
    }

    fn remove(&mut self, id: &T::Id) -> Result<T> {
        let index = self.position(id).ok_or(StoreError::NotFound)?;
        Ok(self.rows.remove(index))
    }

    fn all(&self) -> Vec<T> {
        self.rows.clone()
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    courses: Table<Course>,
    enrollments: Table<Enrollment>,
    assignments: Table<Assignment>,
    submissions: Table<Submission>,
    materials: Table<Material>,
    results: Table<CourseResult>,
}

impl Tables {
    /// Apply a seat delta to a course, ignoring courses that no longer exist.
    fn adjust_seats(&mut self, course_id: &CourseId, taken: bool) {
        if let Some(course) = self.courses.get_mut(course_id) {
            course.enrolled = if taken {
                course.enrolled.saturating_add(1)
            } else {
                course.enrolled.saturating_sub(1)
            };
        }
    }
}

/// In-memory, lock-protected storage.
///
/// Constructed once per process (or once per test) and shared behind an
/// `Arc`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the demo dataset.
    #[must_use]
    pub fn with_demo_data() -> Self {
        Self::from(crate::seed::demo())
    }
}

impl From<Dataset> for MemoryStore {
    fn from(data: Dataset) -> Self {
        let tables = Tables {
            users: Table::from_rows(data.users),
            courses: Table::from_rows(data.courses),
            enrollments: Table::from_rows(data.enrollments),
            assignments: Table::from_rows(data.assignments),
            submissions: Table::from_rows(data.submissions),
            materials: Table::from_rows(data.materials),
            results: Table::from_rows(data.results),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Store for MemoryStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn insert_user(&self, user: &User) -> Result<()> {
        self.tables.write().users.insert(user)
    }

    fn put_user(&self, user: &User) -> Result<()> {
        self.tables.write().users.replace(user).map(drop)
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(user_id))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .rows
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    fn delete_user(&self, user_id: &UserId) -> Result<()> {
        self.tables.write().users.remove(user_id).map(drop)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().users.all())
    }

    // =========================================================================
    // Course Operations
    // =========================================================================

    fn insert_course(&self, course: &Course) -> Result<()> {
        self.tables.write().courses.insert(course)
    }

    fn put_course(&self, course: &Course) -> Result<Course> {
        let mut tables = self.tables.write();
        let enrolled = tables
            .courses
            .get_mut(&course.id)
            .ok_or(StoreError::NotFound)?
            .enrolled;

        let stored = Course {
            enrolled,
            ..course.clone()
        };
        tables.courses.replace(&stored)?;
        Ok(stored)
    }

    fn get_course(&self, course_id: &CourseId) -> Result<Option<Course>> {
        Ok(self.tables.read().courses.get(course_id))
    }

    fn delete_course(&self, course_id: &CourseId) -> Result<()> {
        self.tables.write().courses.remove(course_id).map(drop)
    }

    fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.tables.read().courses.all())
    }

    // =========================================================================
    // Enrollment Operations
    // =========================================================================

    fn enroll(&self, enrollment: &Enrollment) -> Result<Course> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;

        let course = tables
            .courses
            .get_mut(&enrollment.course.id)
            .ok_or(StoreError::NotFound)?;

        let already_enrolled = tables.enrollments.rows.iter().any(|e| {
            e.student.id == enrollment.student.id
                && e.course.id == enrollment.course.id
                && e.status.occupies_seat()
        });
        if already_enrolled {
            return Err(StoreError::DuplicateEnrollment);
        }
        if course.is_full() {
            return Err(StoreError::CapacityReached);
        }

        tables.enrollments.insert(enrollment)?;
        if enrollment.status.occupies_seat() {
            course.enrolled += 1;
        }
        tracing::debug!(
            course_id = %course.id,
            enrolled = course.enrolled,
            capacity = course.capacity,
            "Seat taken"
        );
        Ok(course.clone())
    }

    fn put_enrollment(&self, enrollment: &Enrollment) -> Result<()> {
        let mut tables = self.tables.write();
        let previous = tables.enrollments.replace(enrollment)?;

        let was_seated = previous.status.occupies_seat();
        let is_seated = enrollment.status.occupies_seat();
        if was_seated != is_seated {
            tables.adjust_seats(&enrollment.course.id, is_seated);
        }
        Ok(())
    }

    fn get_enrollment(&self, enrollment_id: &EnrollmentId) -> Result<Option<Enrollment>> {
        Ok(self.tables.read().enrollments.get(enrollment_id))
    }

    fn delete_enrollment(&self, enrollment_id: &EnrollmentId) -> Result<()> {
        let mut tables = self.tables.write();
        let removed = tables.enrollments.remove(enrollment_id)?;
        if removed.status.occupies_seat() {
            tables.adjust_seats(&removed.course.id, false);
        }
        Ok(())
    }

    fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        Ok(self.tables.read().enrollments.all())
    }

    // =========================================================================
    // Assignment Operations
    // =========================================================================

    fn insert_assignment(&self, assignment: &Assignment) -> Result<()> {
        self.tables.write().assignments.insert(assignment)
    }

    fn put_assignment(&self, assignment: &Assignment) -> Result<()> {
        self.tables.write().assignments.replace(assignment).map(drop)
    }

    fn get_assignment(&self, assignment_id: &AssignmentId) -> Result<Option<Assignment>> {
        Ok(self.tables.read().assignments.get(assignment_id))
    }

    fn delete_assignment(&self, assignment_id: &AssignmentId) -> Result<()> {
        self.tables.write().assignments.remove(assignment_id).map(drop)
    }

    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.tables.read().assignments.all())
    }

    // =========================================================================
    // Submission Operations
    // =========================================================================

    fn insert_submission(&self, submission: &Submission) -> Result<()> {
        self.tables.write().submissions.insert(submission)
    }

    fn put_submission(&self, submission: &Submission) -> Result<()> {
        self.tables.write().submissions.replace(submission).map(drop)
    }

    fn get_submission(&self, submission_id: &SubmissionId) -> Result<Option<Submission>> {
        Ok(self.tables.read().submissions.get(submission_id))
    }

    fn delete_submission(&self, submission_id: &SubmissionId) -> Result<()> {
        self.tables.write().submissions.remove(submission_id).map(drop)
    }

    fn list_submissions(&self) -> Result<Vec<Submission>> {
        Ok(self.tables.read().submissions.all())
    }

    // =========================================================================
    // Material Operations
    // =========================================================================

    fn insert_material(&self, material: &Material) -> Result<()> {
        self.tables.write().materials.insert(material)
    }

    fn put_material(&self, material: &Material) -> Result<()> {
        self.tables.write().materials.replace(material).map(drop)
    }

    fn get_material(&self, material_id: &MaterialId) -> Result<Option<Material>> {
        Ok(self.tables.read().materials.get(material_id))
    }

    fn delete_material(&self, material_id: &MaterialId) -> Result<()> {
        self.tables.write().materials.remove(material_id).map(drop)
    }

    fn list_materials(&self) -> Result<Vec<Material>> {
        Ok(self.tables.read().materials.all())
    }

    // =========================================================================
    // Result Operations
    // =========================================================================

    fn insert_result(&self, result: &CourseResult) -> Result<()> {
        self.tables.write().results.insert(result)
    }

    fn put_result(&self, result: &CourseResult) -> Result<()> {
        self.tables.write().results.replace(result).map(drop)
    }

    fn get_result(&self, result_id: &ResultId) -> Result<Option<CourseResult>> {
        Ok(self.tables.read().results.get(result_id))
    }

    fn delete_result(&self, result_id: &ResultId) -> Result<()> {
        self.tables.write().results.remove(result_id).map(drop)
    }

    fn list_results(&self) -> Result<Vec<CourseResult>> {
        Ok(self.tables.read().results.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CourseLevel, CourseStatus, EnrollmentStatus, Role};
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    fn create_test_user(id: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(id).unwrap(),
            first_name: "Test".to_string(),
            last_name: id.to_string(),
            email: format!("{id}@example.com"),
            phone: None,
            role,
            is_active: true,
            student_id: None,
            instructor_id: None,
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_test_course(id: &str, capacity: u32) -> Course {
        let now = Utc::now();
        Course {
            id: CourseId::new(id).unwrap(),
            title: format!("Course {id}"),
            code: id.to_uppercase(),
            description: String::new(),
            instructor: None,
            capacity,
            enrolled: 0,
            duration: "12 weeks".to_string(),
            credits: 3,
            level: CourseLevel::Beginner,
            category: "General".to_string(),
            status: CourseStatus::Active,
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_test_enrollment(student: &User, course: &Course) -> Enrollment {
        let now = Utc::now();
        Enrollment {
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
        }
    }

    #[test]
    fn user_crud() {
        let store = MemoryStore::new();
        let user = create_test_user("u1", Role::Student);

        store.insert_user(&user).unwrap();
        assert!(matches!(
            store.insert_user(&user),
            Err(StoreError::Duplicate(_))
        ));

        let found = store.find_user_by_email("u1@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_user_by_email("U1@example.com").unwrap().is_none());

        let mut renamed = user.clone();
        renamed.first_name = "Renamed".to_string();
        store.put_user(&renamed).unwrap();
        assert_eq!(
            store.get_user(&user.id).unwrap().unwrap().first_name,
            "Renamed"
        );

        store.delete_user(&user.id).unwrap();
        assert!(store.get_user(&user.id).unwrap().is_none());
        assert_eq!(store.delete_user(&user.id), Err(StoreError::NotFound));
    }

    #[test]
    fn put_requires_existing_record() {
        let store = MemoryStore::new();
        let course = create_test_course("c1", 10);
        assert_eq!(store.put_course(&course), Err(StoreError::NotFound));
    }

    #[test]
    fn put_course_keeps_the_seat_counter() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let course = create_test_course("c1", 10);
        store.insert_course(&course).unwrap();
        store
            .enroll(&create_test_enrollment(&student, &course))
            .unwrap();

        let mut stale = course.clone();
        stale.title = "Renamed".to_string();
        stale.enrolled = 7;
        let stored = store.put_course(&stale).unwrap();

        assert_eq!(stored.enrolled, 1);
        assert_eq!(stored.title, "Renamed");
        assert_eq!(store.get_course(&course.id).unwrap().unwrap(), stored);
    }

    #[test]
    fn stale_course_writes_race_enrollments_without_losing_seats() {
        const STUDENTS: usize = 500;

        let store = Arc::new(MemoryStore::new());
        let course = create_test_course("c1", 1_000_000);
        store.insert_course(&course).unwrap();

        let enroller = {
            let store = Arc::clone(&store);
            let course = course.clone();
            thread::spawn(move || {
                for i in 0..STUDENTS {
                    let student = create_test_user(&format!("s{i}"), Role::Student);
                    store
                        .enroll(&create_test_enrollment(&student, &course))
                        .unwrap();
                }
            })
        };

        for i in 0..STUDENTS {
            let mut stale = course.clone();
            stale.title = format!("Title {i}");
            store.put_course(&stale).unwrap();
        }
        enroller.join().unwrap();

        let stored = store.get_course(&course.id).unwrap().unwrap();
        assert_eq!(stored.enrolled as usize, STUDENTS);
        assert_eq!(store.list_enrollments().unwrap().len(), STUDENTS);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = MemoryStore::new();
        for id in ["c3", "c1", "c2"] {
            store.insert_course(&create_test_course(id, 5)).unwrap();
        }
        let codes: Vec<_> = store
            .list_courses()
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, ["C3", "C1", "C2"]);
    }

    #[test]
    fn enroll_takes_a_seat() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let course = create_test_course("c1", 2);
        store.insert_course(&course).unwrap();

        let updated = store
            .enroll(&create_test_enrollment(&student, &course))
            .unwrap();
        assert_eq!(updated.enrolled, 1);
        assert_eq!(store.get_course(&course.id).unwrap().unwrap().enrolled, 1);
        assert_eq!(store.list_enrollments().unwrap().len(), 1);
    }

    #[test]
    fn enroll_rejects_full_course_without_writing() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let mut course = create_test_course("c1", 3);
        course.enrolled = 3;
        store.insert_course(&course).unwrap();

        let result = store.enroll(&create_test_enrollment(&student, &course));
        assert_eq!(result, Err(StoreError::CapacityReached));
        assert_eq!(store.get_course(&course.id).unwrap().unwrap(), course);
        assert!(store.list_enrollments().unwrap().is_empty());
    }

    #[test]
    fn enroll_rejects_duplicate_pair() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let course = create_test_course("c1", 10);
        store.insert_course(&course).unwrap();

        store
            .enroll(&create_test_enrollment(&student, &course))
            .unwrap();
        let second = store.enroll(&create_test_enrollment(&student, &course));

        assert_eq!(second, Err(StoreError::DuplicateEnrollment));
        assert_eq!(store.list_enrollments().unwrap().len(), 1);
        assert_eq!(store.get_course(&course.id).unwrap().unwrap().enrolled, 1);
    }

    #[test]
    fn enroll_unknown_course() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let course = create_test_course("ghost", 10);
        assert_eq!(
            store.enroll(&create_test_enrollment(&student, &course)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn dropping_frees_the_seat_and_allows_reenrollment() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let course = create_test_course("c1", 1);
        store.insert_course(&course).unwrap();

        let mut enrollment = create_test_enrollment(&student, &course);
        store.enroll(&enrollment).unwrap();

        enrollment.status = EnrollmentStatus::Dropped;
        store.put_enrollment(&enrollment).unwrap();
        assert_eq!(store.get_course(&course.id).unwrap().unwrap().enrolled, 0);

        let again = store
            .enroll(&create_test_enrollment(&student, &course))
            .unwrap();
        assert_eq!(again.enrolled, 1);
    }

    #[test]
    fn status_change_without_seat_change_keeps_count() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let course = create_test_course("c1", 5);
        store.insert_course(&course).unwrap();

        let mut enrollment = create_test_enrollment(&student, &course);
        store.enroll(&enrollment).unwrap();

        enrollment.status = EnrollmentStatus::Completed;
        enrollment.progress = 100;
        store.put_enrollment(&enrollment).unwrap();
        assert_eq!(store.get_course(&course.id).unwrap().unwrap().enrolled, 1);
    }

    #[test]
    fn deleting_enrollment_frees_the_seat() {
        let store = MemoryStore::new();
        let student = create_test_user("s1", Role::Student);
        let course = create_test_course("c1", 5);
        store.insert_course(&course).unwrap();

        let enrollment = create_test_enrollment(&student, &course);
        store.enroll(&enrollment).unwrap();
        store.delete_enrollment(&enrollment.id).unwrap();

        assert_eq!(store.get_course(&course.id).unwrap().unwrap().enrolled, 0);
        assert!(store.get_enrollment(&enrollment.id).unwrap().is_none());
    }

    #[test]
    fn demo_data_is_loaded() {
        let store = MemoryStore::with_demo_data();
        assert_eq!(store.list_users().unwrap().len(), 8);
        assert_eq!(store.list_courses().unwrap().len(), 5);
        assert_eq!(store.list_enrollments().unwrap().len(), 5);
        assert_eq!(store.list_assignments().unwrap().len(), 5);
        assert_eq!(store.list_materials().unwrap().len(), 4);
        assert_eq!(store.list_results().unwrap().len(), 3);
        assert!(store.list_submissions().unwrap().is_empty());
    }
}
