//! Assignments and their submissions.
//!
//! Assignment creation and submission arrive as uploads: text fields plus an
//! optional (for assignments) or required (for submissions) `file` part.

use chrono::Utc;
use lms_core::{AssignmentId, CourseId, SubmissionId, UserId};
use lms_store::{
    Assignment, AssignmentStatus, AuthorSummary, Store, Submission, SubmissionStatus,
};

use crate::enrollments::enrolled_course_ids;
use crate::error::{or_missing, LmsError, Result};
use crate::types::{parse_datetime, AssignmentPatch, Caller, SubmissionGrade, Upload};

const DEFAULT_MAX_POINTS: u32 = 100;

/// List assignments, optionally for one course.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list<S: Store>(store: &S, course: Option<&CourseId>) -> Result<Vec<Assignment>> {
    let mut assignments = store.list_assignments()?;
    if let Some(course) = course {
        assignments.retain(|a| &a.course.id == course);
    }
    Ok(assignments)
}

/// Assignments in the courses the caller is enrolled in.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn enrolled<S: Store>(store: &S, caller: &Caller) -> Result<Vec<Assignment>> {
    let courses = enrolled_course_ids(store, &caller.user_id)?;
    let mut assignments = store.list_assignments()?;
    assignments.retain(|a| courses.contains(&a.course.id));
    Ok(assignments)
}

/// Fetch one assignment.
///
/// # Errors
///
/// Returns `LmsError::AssignmentNotFound` if the assignment does not exist.
pub fn get<S: Store>(store: &S, assignment_id: &AssignmentId) -> Result<Assignment> {
    store
        .get_assignment(assignment_id)?
        .ok_or(LmsError::AssignmentNotFound)
}

/// Snapshot of the caller for `createdBy`/`uploadedBy` fields.
pub(crate) fn author<S: Store>(store: &S, user_id: &UserId) -> Result<AuthorSummary> {
    Ok(store
        .get_user(user_id)?
        .map_or_else(AuthorSummary::system, |u| u.author_summary()))
}

/// Create an assignment from an upload.
///
/// Fields: `title`, `course` (or `courseId`), `dueDate` are required;
/// `description`, `maxPoints` (default 100) and `status` are optional. A
/// `file` part becomes the attachment.
///
/// # Errors
///
/// Returns `LmsError::Validation` for missing or malformed fields and
/// `LmsError::CourseNotFound` if the course does not resolve.
pub fn create<S: Store>(store: &S, caller: &Caller, upload: &Upload) -> Result<Assignment> {
    let title = upload.require("title")?.to_string();
    let course_id = CourseId::new(
        upload
            .get_any(&["course", "courseId"])
            .ok_or_else(|| LmsError::validation("course is required"))?,
    )?;
    let due_date = parse_datetime("dueDate", upload.require("dueDate")?)?;
    let max_points = upload.parse::<u32>("maxPoints")?.unwrap_or(DEFAULT_MAX_POINTS);
    let status = upload
        .parse_enum::<AssignmentStatus>("status")?
        .unwrap_or_default();

    let course = store
        .get_course(&course_id)?
        .ok_or(LmsError::CourseNotFound)?;

    let now = Utc::now();
    let assignment = Assignment {
        id: AssignmentId::generate(),
        title,
        description: upload.get("description").unwrap_or_default().to_string(),
        course: course.summary(),
        due_date,
        max_points,
        status,
        created_by: author(store, &caller.user_id)?,
        attachment: upload.file.as_ref().map(|f| f.meta("assignments")),
        created_at: now,
        updated_at: now,
    };
    store.insert_assignment(&assignment)?;

    tracing::info!(
        assignment_id = %assignment.id,
        course_id = %course.id,
        has_attachment = assignment.attachment.is_some(),
        "Created assignment"
    );
    Ok(assignment)
}

/// Merge a patch into an assignment.
///
/// # Errors
///
/// Returns `LmsError::AssignmentNotFound` if the assignment does not exist.
pub fn update<S: Store>(
    store: &S,
    assignment_id: &AssignmentId,
    patch: AssignmentPatch,
) -> Result<Assignment> {
    let mut assignment = get(store, assignment_id)?;

    if let Some(title) = patch.title {
        assignment.title = title;
    }
    if let Some(description) = patch.description {
        assignment.description = description;
    }
    if let Some(due_date) = patch.due_date {
        assignment.due_date = due_date;
    }
    if let Some(max_points) = patch.max_points {
        assignment.max_points = max_points;
    }
    if let Some(status) = patch.status {
        assignment.status = status;
    }
    assignment.updated_at = Utc::now();

    store
        .put_assignment(&assignment)
        .map_err(|e| or_missing(e, LmsError::AssignmentNotFound))?;
    Ok(assignment)
}

/// Delete an assignment together with its submissions.
///
/// # Errors
///
/// Returns `LmsError::AssignmentNotFound` if the assignment does not exist.
pub fn delete<S: Store>(store: &S, assignment_id: &AssignmentId) -> Result<()> {
    store
        .delete_assignment(assignment_id)
        .map_err(|e| or_missing(e, LmsError::AssignmentNotFound))?;

    let mut removed = 0_usize;
    for submission in store.list_submissions()? {
        if &submission.assignment == assignment_id {
            store.delete_submission(&submission.id)?;
            removed += 1;
        }
    }

    tracing::info!(assignment_id = %assignment_id, submissions = removed, "Deleted assignment");
    Ok(())
}

// =============================================================================
// Submissions
// =============================================================================

/// Submissions for one assignment.
///
/// # Errors
///
/// Returns `LmsError::AssignmentNotFound` if the assignment does not exist.
pub fn submissions<S: Store>(store: &S, assignment_id: &AssignmentId) -> Result<Vec<Submission>> {
    get(store, assignment_id)?;
    let mut submissions = store.list_submissions()?;
    submissions.retain(|s| &s.assignment == assignment_id);
    Ok(submissions)
}

/// The caller's own submissions across all assignments.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn my_submissions<S: Store>(store: &S, caller: &Caller) -> Result<Vec<Submission>> {
    let mut submissions = store.list_submissions()?;
    submissions.retain(|s| s.student.id == caller.user_id);
    Ok(submissions)
}

/// Submit a file for an assignment.
///
/// A student submitting again replaces their earlier file and the
/// submission returns to `submitted`.
///
/// # Errors
///
/// Returns `LmsError::Validation` without a `file` part,
/// `LmsError::AssignmentNotFound` for an unknown assignment and
/// `LmsError::UserNotFound` if the caller's account no longer exists.
pub fn submit<S: Store>(
    store: &S,
    caller: &Caller,
    assignment_id: &AssignmentId,
    upload: &Upload,
) -> Result<Submission> {
    let file = upload
        .file
        .as_ref()
        .ok_or_else(|| LmsError::validation("No file uploaded"))?;
    let assignment = get(store, assignment_id)?;
    let student = store
        .get_user(&caller.user_id)?
        .ok_or(LmsError::UserNotFound)?;

    let now = Utc::now();
    let existing = store
        .list_submissions()?
        .into_iter()
        .find(|s| &s.assignment == assignment_id && s.student.id == student.id);

    let submission = match existing {
        Some(mut submission) => {
            submission.file = file.meta("submissions");
            submission.status = SubmissionStatus::Submitted;
            submission.grade = None;
            submission.remarks = None;
            submission.submitted_at = now;
            submission.updated_at = now;
            store.put_submission(&submission)?;
            submission
        }
        None => {
            let submission = Submission {
                id: SubmissionId::generate(),
                assignment: assignment.id.clone(),
                assignment_title: assignment.title.clone(),
                student: student.student_summary(),
                file: file.meta("submissions"),
                status: SubmissionStatus::Submitted,
                grade: None,
                remarks: None,
                submitted_at: now,
                updated_at: now,
            };
            store.insert_submission(&submission)?;
            submission
        }
    };

    tracing::info!(
        submission_id = %submission.id,
        assignment_id = %assignment.id,
        student_id = %student.id,
        size = submission.file.size,
        "Received submission"
    );
    Ok(submission)
}

fn submission_of<S: Store>(
    store: &S,
    assignment_id: &AssignmentId,
    submission_id: &SubmissionId,
) -> Result<Submission> {
    store
        .get_submission(submission_id)?
        .filter(|s| &s.assignment == assignment_id)
        .ok_or(LmsError::SubmissionNotFound)
}

/// Grade a submission.
///
/// # Errors
///
/// Returns `LmsError::SubmissionNotFound` if the submission does not exist
/// under the assignment, and `LmsError::Validation` for an empty grade.
pub fn grade<S: Store>(
    store: &S,
    assignment_id: &AssignmentId,
    submission_id: &SubmissionId,
    grade: SubmissionGrade,
) -> Result<Submission> {
    if grade.grade.trim().is_empty() {
        return Err(LmsError::validation("grade is required"));
    }
    let mut submission = submission_of(store, assignment_id, submission_id)?;
    submission.grade = Some(grade.grade);
    submission.remarks = grade.remarks;
    submission.status = SubmissionStatus::Graded;
    submission.updated_at = Utc::now();

    store
        .put_submission(&submission)
        .map_err(|e| or_missing(e, LmsError::SubmissionNotFound))?;
    tracing::info!(submission_id = %submission_id, "Graded submission");
    Ok(submission)
}

/// Delete a submission.
///
/// # Errors
///
/// Returns `LmsError::SubmissionNotFound` if the submission does not exist
/// under the assignment.
pub fn delete_submission<S: Store>(
    store: &S,
    assignment_id: &AssignmentId,
    submission_id: &SubmissionId,
) -> Result<()> {
    submission_of(store, assignment_id, submission_id)?;
    store
        .delete_submission(submission_id)
        .map_err(|e| or_missing(e, LmsError::SubmissionNotFound))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilePart;
    use lms_core::Role;
    use lms_store::MemoryStore;

    fn caller(id: &str, role: Role) -> Caller {
        Caller::new(UserId::new(id).unwrap(), role)
    }

    fn aid(id: &str) -> AssignmentId {
        AssignmentId::new(id).unwrap()
    }

    fn pdf(name: &str) -> FilePart {
        FilePart {
            file_name: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    fn new_assignment() -> Upload {
        Upload::default()
            .field("title", "Linked Lists")
            .field("course", "course1")
            .field("dueDate", "2024-04-01")
            .field("description", "Implement a doubly linked list")
    }

    #[test]
    fn list_and_filter_by_course() {
        let store = MemoryStore::with_demo_data();
        assert_eq!(list(&store, None).unwrap().len(), 5);
        let cs201 = CourseId::new("course2").unwrap();
        let only = list(&store, Some(&cs201)).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].title, "Algorithm Analysis");
    }

    #[test]
    fn enrolled_joins_through_enrollments() {
        let store = MemoryStore::with_demo_data();
        // John is enrolled in CS101 and CS201.
        let mine = enrolled(&store, &caller("student1", Role::Student)).unwrap();
        let ids: Vec<_> = mine.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["assignment1", "assignment2"]);

        assert!(enrolled(&store, &caller("student5", Role::Student))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn create_with_defaults_and_attachment() {
        let store = MemoryStore::with_demo_data();
        let sarah = caller("instructor1", Role::Instructor);

        let plain = create(&store, &sarah, &new_assignment()).unwrap();
        assert_eq!(plain.max_points, 100);
        assert_eq!(plain.status, AssignmentStatus::Active);
        assert_eq!(plain.created_by.last_name, "Johnson");
        assert!(plain.attachment.is_none());

        let with_file = create(
            &store,
            &sarah,
            &new_assignment().field("maxPoints", "50").with_file(pdf("brief.pdf")),
        )
        .unwrap();
        assert_eq!(with_file.max_points, 50);
        assert_eq!(with_file.attachment.unwrap().original_name, "brief.pdf");
    }

    #[test]
    fn create_validates_fields() {
        let store = MemoryStore::with_demo_data();
        let sarah = caller("instructor1", Role::Instructor);

        let no_title = Upload::default().field("course", "course1").field("dueDate", "2024-04-01");
        assert!(matches!(create(&store, &sarah, &no_title), Err(LmsError::Validation(_))));

        let bad_date = new_assignment().field("dueDate", "soon");
        assert!(matches!(create(&store, &sarah, &bad_date), Err(LmsError::Validation(_))));

        let ghost = new_assignment().field("course", "ghost");
        assert!(matches!(create(&store, &sarah, &ghost), Err(LmsError::CourseNotFound)));
    }

    #[test]
    fn submit_grade_and_delete() {
        let store = MemoryStore::with_demo_data();
        let john = caller("student1", Role::Student);

        let submission = submit(
            &store,
            &john,
            &aid("assignment1"),
            &Upload::default().with_file(pdf("answers.pdf")),
        )
        .unwrap();
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(submission.assignment_title, "Programming Assignment 1");
        assert_eq!(submission.file.size, 8);

        let graded = grade(
            &store,
            &aid("assignment1"),
            &submission.id,
            SubmissionGrade {
                grade: "A".into(),
                remarks: Some("Clean work".into()),
            },
        )
        .unwrap();
        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.remarks.as_deref(), Some("Clean work"));

        assert_eq!(submissions(&store, &aid("assignment1")).unwrap().len(), 1);
        assert_eq!(my_submissions(&store, &john).unwrap().len(), 1);

        // Wrong parent assignment.
        assert!(matches!(
            delete_submission(&store, &aid("assignment2"), &submission.id),
            Err(LmsError::SubmissionNotFound)
        ));
        delete_submission(&store, &aid("assignment1"), &submission.id).unwrap();
        assert!(submissions(&store, &aid("assignment1")).unwrap().is_empty());
    }

    #[test]
    fn resubmission_replaces_file() {
        let store = MemoryStore::with_demo_data();
        let john = caller("student1", Role::Student);
        let first = submit(
            &store,
            &john,
            &aid("assignment1"),
            &Upload::default().with_file(pdf("v1.pdf")),
        )
        .unwrap();
        let second = submit(
            &store,
            &john,
            &aid("assignment1"),
            &Upload::default().with_file(pdf("v2.pdf")),
        )
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.file.original_name, "v2.pdf");
        assert_eq!(submissions(&store, &aid("assignment1")).unwrap().len(), 1);
    }

    #[test]
    fn submit_requires_file_and_assignment() {
        let store = MemoryStore::with_demo_data();
        let john = caller("student1", Role::Student);
        assert!(matches!(
            submit(&store, &john, &aid("assignment1"), &Upload::default()),
            Err(LmsError::Validation(_))
        ));
        assert!(matches!(
            submit(
                &store,
                &john,
                &aid("ghost"),
                &Upload::default().with_file(pdf("a.pdf"))
            ),
            Err(LmsError::AssignmentNotFound)
        ));
    }

    #[test]
    fn delete_assignment_removes_its_submissions() {
        let store = MemoryStore::with_demo_data();
        submit(
            &store,
            &caller("student1", Role::Student),
            &aid("assignment1"),
            &Upload::default().with_file(pdf("a.pdf")),
        )
        .unwrap();

        delete(&store, &aid("assignment1")).unwrap();
        assert!(store.list_submissions().unwrap().is_empty());
        assert!(matches!(
            delete(&store, &aid("assignment1")),
            Err(LmsError::AssignmentNotFound)
        ));
    }

    #[test]
    fn update_changes_fields() {
        let store = MemoryStore::with_demo_data();
        let updated = update(
            &store,
            &aid("assignment3"),
            AssignmentPatch {
                max_points: Some(250),
                status: Some(AssignmentStatus::Closed),
                ..AssignmentPatch::default()
            },
        )
        .unwrap();
        assert_eq!(updated.max_points, 250);
        assert_eq!(updated.status, AssignmentStatus::Closed);
        assert_eq!(updated.title, "HTML/CSS Portfolio");
    }
}
