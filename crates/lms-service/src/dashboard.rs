//! Read-side aggregations for the dashboards.
//!
//! Every view is recomputed from the store on each call; nothing here keeps
//! state between calls.

use chrono::{DateTime, Utc};
use lms_core::{CourseId, EnrollmentId, Role};
use lms_store::{CourseSummary, Enrollment, EnrollmentStatus, Store, StudentSummary};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Headline counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Courses in the catalogue.
    pub total_courses: usize,
    /// Users with the student role.
    pub total_students: usize,
    /// Enrollments of any status.
    pub total_enrollments: usize,
    /// Enrollments with status `completed`.
    pub completed_courses: usize,
}

/// An enrollment as shown in the recent-enrollments list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEnrollment {
    /// Enrollment id.
    #[serde(rename = "_id")]
    pub id: EnrollmentId,
    /// The enrolled student.
    pub student: StudentSummary,
    /// The course enrolled in.
    pub course: CourseSummary,
    /// Current enrollment status.
    pub status: EnrollmentStatus,
    /// When the enrollment was made.
    pub created_at: DateTime<Utc>,
}

/// Per-course pass/fail figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePerformance {
    /// Course id.
    #[serde(rename = "_id")]
    pub id: CourseId,
    /// Course title.
    pub course_title: String,
    /// Course code.
    pub course_code: String,
    /// Enrollments in the course, whatever their status.
    pub total_students: usize,
    /// Mean enrollment score, ungraded enrollments counting as zero.
    pub average_score: u32,
    /// Completed enrollments scoring at least 60.
    pub passed_count: usize,
    /// Completed enrollments scoring below 60.
    pub failed_count: usize,
    /// `passed_count` as a percentage of `total_students`.
    pub pass_rate: u32,
}

/// Counts across every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Courses in the catalogue.
    pub total_courses: usize,
    /// Users with the student role.
    pub total_students: usize,
    /// Users with the instructor role.
    pub total_instructors: usize,
    /// Enrollments of any status.
    pub total_enrollments: usize,
    /// Stored results, pending ones included.
    pub total_results: usize,
}

/// Enrollment status breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentBreakdown {
    /// Enrollments with status `active`.
    pub active: usize,
    /// Enrollments with status `completed`.
    pub completed: usize,
    /// `completed` as a rounded percentage of all enrollments.
    pub completion_rate: u32,
}

/// Result performance summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    /// Mean final percentage over all results, pending ones counting as zero.
    pub average_score: u32,
    /// The first course with the highest average score.
    pub top_course: Option<CoursePerformance>,
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// The enrollment behind this entry.
    pub id: EnrollmentId,
    /// Student's full name.
    pub student_name: String,
    /// Course title.
    pub course_name: String,
    /// Enrollment status.
    pub status: EnrollmentStatus,
    /// When the enrollment was made.
    pub date: DateTime<Utc>,
}

/// Consolidated metrics object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Collection counts.
    pub overview: Overview,
    /// Enrollment status figures.
    pub enrollments: EnrollmentBreakdown,
    /// Result averages and the best course.
    pub performance: PerformanceSummary,
    /// Latest enrollments, newest first.
    pub recent_activity: Vec<Activity>,
}

/// Content counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    /// Materials across all courses.
    pub total_materials: usize,
    /// Assignments across all courses.
    pub total_assignments: usize,
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn rounded_ratio(numerator: f64, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (numerator / denominator as f64).round().max(0.0) as u32
}

fn count_status(enrollments: &[Enrollment], status: EnrollmentStatus) -> usize {
    enrollments.iter().filter(|e| e.status == status).count()
}

/// Headline counts.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn stats<S: Store>(store: &S) -> Result<DashboardStats> {
    let enrollments = store.list_enrollments()?;
    Ok(DashboardStats {
        total_courses: store.list_courses()?.len(),
        total_students: store
            .list_users()?
            .iter()
            .filter(|u| u.role == Role::Student)
            .count(),
        total_enrollments: enrollments.len(),
        completed_courses: count_status(&enrollments, EnrollmentStatus::Completed),
    })
}

/// The `limit` most recently created enrollments, newest first.
///
/// Enrollments created at the same instant keep the later-inserted one
/// first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn recent_enrollments<S: Store>(store: &S, limit: usize) -> Result<Vec<RecentEnrollment>> {
    let mut enrollments = store.list_enrollments()?;
    enrollments.reverse();
    enrollments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(enrollments
        .into_iter()
        .take(limit)
        .map(|e| RecentEnrollment {
            id: e.id,
            student: e.student,
            course: e.course,
            status: e.status,
            created_at: e.created_at,
        })
        .collect())
}

/// Pass/fail figures for every course.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn course_performance<S: Store>(store: &S) -> Result<Vec<CoursePerformance>> {
    let enrollments = store.list_enrollments()?;

    Ok(store
        .list_courses()?
        .into_iter()
        .map(|course| {
            let in_course: Vec<&Enrollment> = enrollments
                .iter()
                .filter(|e| e.course.id == course.id)
                .collect();
            let completed_scores = || {
                in_course
                    .iter()
                    .filter(|e| e.status == EnrollmentStatus::Completed)
                    .filter_map(|e| e.score.filter(|s| *s > 0.0))
            };
            let passed_count = completed_scores().filter(|s| *s >= 60.0).count();
            let failed_count = completed_scores().filter(|s| *s < 60.0).count();
            let score_sum: f64 = in_course.iter().map(|e| e.score.unwrap_or(0.0)).sum();
            let total = in_course.len();

            CoursePerformance {
                id: course.id,
                course_title: course.title,
                course_code: course.code,
                total_students: total,
                average_score: rounded_ratio(score_sum, total),
                passed_count,
                failed_count,
                pass_rate: rounded_ratio(passed_count as f64 * 100.0, total),
            }
        })
        .collect())
}

/// Consolidated metrics.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn metrics<S: Store>(store: &S, recent_limit: usize) -> Result<DashboardMetrics> {
    let users = store.list_users()?;
    let enrollments = store.list_enrollments()?;
    let results = store.list_results()?;
    let performance = course_performance(store)?;

    let completed = count_status(&enrollments, EnrollmentStatus::Completed);
    let percentage_sum: f64 = results
        .iter()
        .map(|r| f64::from(r.final_percentage.unwrap_or(0)))
        .sum();

    let top_course = performance.into_iter().fold(None, |top: Option<CoursePerformance>, current| {
        match top {
            Some(top) if current.average_score <= top.average_score => Some(top),
            _ => Some(current),
        }
    });

    let recent_activity = recent_enrollments(store, recent_limit)?
        .into_iter()
        .map(|e| Activity {
            id: e.id,
            student_name: format!("{} {}", e.student.first_name, e.student.last_name),
            course_name: e.course.title,
            status: e.status,
            date: e.created_at,
        })
        .collect();

    Ok(DashboardMetrics {
        overview: Overview {
            total_courses: store.list_courses()?.len(),
            total_students: users.iter().filter(|u| u.role == Role::Student).count(),
            total_instructors: users.iter().filter(|u| u.role == Role::Instructor).count(),
            total_enrollments: enrollments.len(),
            total_results: results.len(),
        },
        enrollments: EnrollmentBreakdown {
            active: count_status(&enrollments, EnrollmentStatus::Active),
            completed,
            completion_rate: rounded_ratio(completed as f64 * 100.0, enrollments.len()),
        },
        performance: PerformanceSummary {
            average_score: rounded_ratio(percentage_sum, results.len()),
            top_course,
        },
        recent_activity,
    })
}

/// Material and assignment counts.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn counts<S: Store>(store: &S) -> Result<DashboardCounts> {
    Ok(DashboardCounts {
        total_materials: store.list_materials()?.len(),
        total_assignments: store.list_assignments()?.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_store::MemoryStore;

    #[test]
    fn stats_over_demo_data() {
        let store = MemoryStore::with_demo_data();
        let stats = stats(&store).unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_courses: 5,
                total_students: 5,
                total_enrollments: 5,
                completed_courses: 1,
            }
        );
    }

    #[test]
    fn reads_do_not_advance_anything() {
        let store = MemoryStore::with_demo_data();
        assert_eq!(stats(&store).unwrap(), stats(&store).unwrap());
        assert_eq!(metrics(&store, 5).unwrap(), metrics(&store, 5).unwrap());
    }

    #[test]
    fn recent_enrollments_are_newest_first_and_stable() {
        let store = MemoryStore::with_demo_data();
        // All demo enrollments share one creation time: later inserts first.
        let recent = recent_enrollments(&store, 3).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["enrollment5", "enrollment4", "enrollment3"]);

        let mut newest = store.list_enrollments().unwrap()[0].clone();
        newest.created_at = Utc::now();
        store.put_enrollment(&newest).unwrap();
        assert_eq!(recent_enrollments(&store, 1).unwrap()[0].id.as_str(), "enrollment1");
    }

    #[test]
    fn course_performance_over_demo_data() {
        let store = MemoryStore::with_demo_data();
        let performance = course_performance(&store).unwrap();
        assert_eq!(performance.len(), 5);

        // CS101: John 92 and Jane 88, both still active.
        let cs101 = &performance[0];
        assert_eq!(cs101.course_code, "CS101");
        assert_eq!(cs101.total_students, 2);
        assert_eq!(cs101.average_score, 90);
        assert_eq!(cs101.passed_count, 0);
        assert_eq!(cs101.pass_rate, 0);

        // WEB101: Jane completed with 96.
        let web101 = &performance[2];
        assert_eq!(web101.passed_count, 1);
        assert_eq!(web101.pass_rate, 100);
        assert_eq!(web101.average_score, 96);

        // ML301 has no enrollments.
        assert_eq!(performance[4].total_students, 0);
        assert_eq!(performance[4].average_score, 0);
    }

    #[test]
    fn metrics_over_demo_data() {
        let store = MemoryStore::with_demo_data();
        let metrics = metrics(&store, 5).unwrap();

        assert_eq!(metrics.overview.total_instructors, 2);
        assert_eq!(metrics.overview.total_results, 3);
        assert_eq!(metrics.enrollments.active, 4);
        assert_eq!(metrics.enrollments.completed, 1);
        assert_eq!(metrics.enrollments.completion_rate, 20);
        // (92 + 96 + 0) / 3
        assert_eq!(metrics.performance.average_score, 63);
        assert_eq!(
            metrics.performance.top_course.unwrap().course_code,
            "WEB101"
        );
        assert_eq!(metrics.recent_activity.len(), 5);
        assert_eq!(metrics.recent_activity[0].student_name, "Alex Wilson");
    }

    #[test]
    fn counts_over_demo_data() {
        let store = MemoryStore::with_demo_data();
        assert_eq!(
            counts(&store).unwrap(),
            DashboardCounts {
                total_materials: 4,
                total_assignments: 5,
            }
        );
    }

    #[test]
    fn empty_store_has_zero_rates() {
        let store = MemoryStore::new();
        let metrics = metrics(&store, 5).unwrap();
        assert_eq!(metrics.enrollments.completion_rate, 0);
        assert_eq!(metrics.performance.average_score, 0);
        assert!(metrics.performance.top_course.is_none());
    }
}
