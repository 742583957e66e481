//! Course results.
//!
//! A result holds one student's scores for one course. When both scores are
//! known the percentage, letter grade and pass/fail status are derived with
//! [`compute_result`].

use chrono::Utc;
use lms_core::{compute_result, paginate, GradeOutcome, PageRequest, Pagination, ResultId};
use lms_store::{CourseResult, ResultStatus, Store};

use crate::error::{or_missing, LmsError, Result};
use crate::types::{Caller, ResultPatch, UpsertResultRequest};

/// List all results.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list<S: Store>(store: &S, page: PageRequest) -> Result<(Vec<CourseResult>, Pagination)> {
    Ok(paginate(store.list_results()?, page))
}

/// The caller's own results.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn for_student<S: Store>(store: &S, caller: &Caller) -> Result<Vec<CourseResult>> {
    let mut results = store.list_results()?;
    results.retain(|r| r.student.id == caller.user_id);
    Ok(results)
}

fn apply(result: &mut CourseResult, outcome: GradeOutcome) {
    result.final_percentage = Some(outcome.percentage);
    result.final_grade = Some(outcome.grade);
    result.status = if outcome.passed {
        ResultStatus::Passed
    } else {
        ResultStatus::Failed
    };
}

/// Record scores for a (student, course) pair, creating or replacing the
/// result.
///
/// # Errors
///
/// Returns `LmsError::InvalidScore` if a score lies outside `[0, 100]`,
/// `LmsError::UserNotFound` or `LmsError::CourseNotFound` if either side
/// does not resolve.
pub fn upsert<S: Store>(store: &S, request: &UpsertResultRequest) -> Result<CourseResult> {
    let outcome = compute_result(request.ca_score, request.final_exam_score)?;

    let student = store
        .get_user(&request.student)?
        .ok_or(LmsError::UserNotFound)?;
    let course = store
        .get_course(&request.course)?
        .ok_or(LmsError::CourseNotFound)?;

    let now = Utc::now();
    let existing = store
        .list_results()?
        .into_iter()
        .find(|r| r.student.id == student.id && r.course.id == course.id);

    let result = match existing {
        Some(mut result) => {
            result.ca_score = Some(request.ca_score);
            result.final_exam_score = Some(request.final_exam_score);
            apply(&mut result, outcome);
            result.updated_at = now;
            store.put_result(&result)?;
            result
        }
        None => {
            let mut result = CourseResult {
                id: ResultId::generate(),
                student: student.student_summary(),
                course: course.summary(),
                ca_score: Some(request.ca_score),
                final_exam_score: Some(request.final_exam_score),
                final_percentage: None,
                final_grade: None,
                status: ResultStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            apply(&mut result, outcome);
            store.insert_result(&result)?;
            result
        }
    };

    tracing::info!(
        result_id = %result.id,
        student_id = %student.id,
        course_id = %course.id,
        percentage = outcome.percentage,
        grade = %outcome.grade,
        "Recorded result"
    );
    Ok(result)
}

/// Change scores or status.
///
/// When the change leaves both scores known, the grade is recomputed. An
/// explicit `status` wins over the derived one.
///
/// # Errors
///
/// Returns `LmsError::ResultNotFound` if the result does not exist and
/// `LmsError::InvalidScore` for an out-of-range score.
pub fn update<S: Store>(store: &S, result_id: &ResultId, patch: &ResultPatch) -> Result<CourseResult> {
    let mut result = store
        .get_result(result_id)?
        .ok_or(LmsError::ResultNotFound)?;

    let scores_changed = patch.ca_score.is_some() || patch.final_exam_score.is_some();
    if patch.ca_score.is_some() {
        result.ca_score = patch.ca_score;
    }
    if patch.final_exam_score.is_some() {
        result.final_exam_score = patch.final_exam_score;
    }
    if scores_changed {
        if let (Some(ca), Some(exam)) = (result.ca_score, result.final_exam_score) {
            apply(&mut result, compute_result(ca, exam)?);
        }
    }
    if let Some(status) = patch.status {
        result.status = status;
    }
    result.updated_at = Utc::now();

    store
        .put_result(&result)
        .map_err(|e| or_missing(e, LmsError::ResultNotFound))?;
    Ok(result)
}

/// Delete a result.
///
/// # Errors
///
/// Returns `LmsError::ResultNotFound` if the result does not exist.
pub fn delete<S: Store>(store: &S, result_id: &ResultId) -> Result<()> {
    store
        .delete_result(result_id)
        .map_err(|e| or_missing(e, LmsError::ResultNotFound))?;
    tracing::info!(result_id = %result_id, "Deleted result");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::{CourseId, LetterGrade, Role, UserId};
    use lms_store::MemoryStore;

    fn scores(student: &str, course: &str, ca: f64, exam: f64) -> UpsertResultRequest {
        UpsertResultRequest {
            student: UserId::new(student).unwrap(),
            course: CourseId::new(course).unwrap(),
            ca_score: ca,
            final_exam_score: exam,
        }
    }

    #[test]
    fn upsert_creates_then_replaces() {
        let store = MemoryStore::with_demo_data();
        let created = upsert(&store, &scores("student3", "course2", 80.0, 90.0)).unwrap();
        assert_eq!(created.final_percentage, Some(86));
        assert_eq!(created.final_grade, Some(LetterGrade::A));
        assert_eq!(created.status, ResultStatus::Passed);

        let replaced = upsert(&store, &scores("student3", "course2", 40.0, 40.0)).unwrap();
        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.final_percentage, Some(40));
        assert_eq!(replaced.final_grade, Some(LetterGrade::D));
        assert_eq!(replaced.status, ResultStatus::Failed);

        let (all, _) = list(&store, PageRequest::default()).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn upsert_rejects_out_of_range_scores_without_writing() {
        let store = MemoryStore::with_demo_data();
        let result = upsert(&store, &scores("student3", "course2", 101.0, 50.0));
        assert!(matches!(result, Err(LmsError::InvalidScore(_))));
        assert!(matches!(
            upsert(&store, &scores("student3", "course2", 50.0, -1.0)),
            Err(LmsError::InvalidScore(_))
        ));
        assert_eq!(store.list_results().unwrap().len(), 3);
    }

    #[test]
    fn upsert_requires_known_student_and_course() {
        let store = MemoryStore::with_demo_data();
        assert!(matches!(
            upsert(&store, &scores("ghost", "course1", 50.0, 50.0)),
            Err(LmsError::UserNotFound)
        ));
        assert!(matches!(
            upsert(&store, &scores("student1", "ghost", 50.0, 50.0)),
            Err(LmsError::CourseNotFound)
        ));
    }

    #[test]
    fn completing_pending_result_derives_grade() {
        let store = MemoryStore::with_demo_data();
        // result3 has a CA score but no exam score yet.
        let id = ResultId::new("result3").unwrap();
        let updated = update(
            &store,
            &id,
            &ResultPatch {
                final_exam_score: Some(70.0),
                ..ResultPatch::default()
            },
        )
        .unwrap();
        // round(85 * 0.4 + 70 * 0.6) = round(34 + 42) = 76
        assert_eq!(updated.final_percentage, Some(76));
        assert_eq!(updated.final_grade, Some(LetterGrade::BPlus));
        assert_eq!(updated.status, ResultStatus::Passed);
    }

    #[test]
    fn explicit_status_wins() {
        let store = MemoryStore::with_demo_data();
        let updated = update(
            &store,
            &ResultId::new("result1").unwrap(),
            &ResultPatch {
                status: Some(ResultStatus::Incomplete),
                ..ResultPatch::default()
            },
        )
        .unwrap();
        assert_eq!(updated.status, ResultStatus::Incomplete);
        assert_eq!(updated.final_percentage, Some(92));
    }

    #[test]
    fn for_student_and_delete() {
        let store = MemoryStore::with_demo_data();
        let john = Caller::new(UserId::new("student1").unwrap(), Role::Student);
        assert_eq!(for_student(&store, &john).unwrap().len(), 2);

        let id = ResultId::new("result1").unwrap();
        delete(&store, &id).unwrap();
        assert_eq!(for_student(&store, &john).unwrap().len(), 1);
        assert!(matches!(delete(&store, &id), Err(LmsError::ResultNotFound)));
        assert!(matches!(
            update(&store, &id, &ResultPatch::default()),
            Err(LmsError::ResultNotFound)
        ));
    }
}
