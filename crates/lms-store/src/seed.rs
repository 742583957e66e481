//! Demo dataset.
//!
//! A small university: one admin, two instructors, five students, five
//! courses and a handful of enrollments, assignments, materials and results.
//! Seed records keep short readable ids (`course1`, `student2`) so they can be
//! referenced from docs and tests. Course seat counters include students who
//! are not part of the sample enrollments.

use chrono::{DateTime, TimeZone, Utc};
use lms_core::{
    AssignmentId, CourseId, EnrollmentId, LetterGrade, MaterialId, ResultId, UserId,
};

use crate::types::{
    Assignment, AssignmentStatus, AuthorSummary, Course, CourseLevel, CourseResult, CourseStatus,
    Enrollment, EnrollmentStatus, FileMeta, FileType, Material, ResultStatus, Role, Submission,
    User,
};

/// A full set of records to load into a store.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// User accounts.
    pub users: Vec<User>,
    /// Courses.
    pub courses: Vec<Course>,
    /// Enrollments.
    pub enrollments: Vec<Enrollment>,
    /// Assignments.
    pub assignments: Vec<Assignment>,
    /// Submissions.
    pub submissions: Vec<Submission>,
    /// Materials.
    pub materials: Vec<Material>,
    /// Results.
    pub results: Vec<CourseResult>,
}

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_default()
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    at(year, month, day, 0, 0, 0)
}

// Seed ids are non-empty literals; `new` cannot fail for them.
fn uid(id: &str) -> UserId {
    UserId::new(id).unwrap_or_else(|_| UserId::generate())
}

fn cid(id: &str) -> CourseId {
    CourseId::new(id).unwrap_or_else(|_| CourseId::generate())
}

struct Person<'a> {
    id: &'a str,
    first: &'a str,
    last: &'a str,
    email: &'a str,
    phone: &'a str,
    role: Role,
    number: Option<&'a str>,
}

fn user(p: &Person<'_>) -> User {
    let created = date(2024, 1, 1);
    let number = p.number.map(ToString::to_string);
    User {
        id: uid(p.id),
        first_name: p.first.to_string(),
        last_name: p.last.to_string(),
        email: p.email.to_string(),
        phone: Some(p.phone.to_string()),
        role: p.role,
        is_active: true,
        student_id: if p.role == Role::Student { number.clone() } else { None },
        instructor_id: if p.role == Role::Instructor { number } else { None },
        password_hash: None,
        created_at: created,
        updated_at: created,
    }
}

fn users() -> [User; 8] {
    [
        Person { id: "admin1", first: "Admin", last: "User", email: "admin@university.edu", phone: "+1234567890", role: Role::Admin, number: None },
        Person { id: "instructor1", first: "Dr. Sarah", last: "Johnson", email: "instructor@university.edu", phone: "+1234567891", role: Role::Instructor, number: Some("INST001") },
        Person { id: "instructor2", first: "Prof. Michael", last: "Brown", email: "michael.brown@university.edu", phone: "+1234567892", role: Role::Instructor, number: Some("INST002") },
        Person { id: "student1", first: "John", last: "Doe", email: "student@university.edu", phone: "+1234567893", role: Role::Student, number: Some("STU001") },
        Person { id: "student2", first: "Jane", last: "Smith", email: "jane.smith@university.edu", phone: "+1234567894", role: Role::Student, number: Some("STU002") },
        Person { id: "student3", first: "Alex", last: "Wilson", email: "alex.wilson@university.edu", phone: "+1234567895", role: Role::Student, number: Some("STU003") },
        Person { id: "student4", first: "Emily", last: "Davis", email: "emily.davis@university.edu", phone: "+1234567896", role: Role::Student, number: Some("STU004") },
        Person { id: "student5", first: "David", last: "Miller", email: "david.miller@university.edu", phone: "+1234567897", role: Role::Student, number: Some("STU005") },
    ]
    .map(|p| user(&p))
}

#[allow(clippy::too_many_arguments)]
fn course(
    id: &str,
    title: &str,
    code: &str,
    description: &str,
    instructor: &User,
    (capacity, enrolled): (u32, u32),
    (duration, credits, level): (&str, u32, CourseLevel),
    category: &str,
    end: DateTime<Utc>,
) -> Course {
    let created = date(2024, 1, 1);
    Course {
        id: cid(id),
        title: title.to_string(),
        code: code.to_string(),
        description: description.to_string(),
        instructor: Some(instructor.instructor_summary()),
        capacity,
        enrolled,
        duration: duration.to_string(),
        credits,
        level,
        category: category.to_string(),
        status: CourseStatus::Active,
        start_date: Some(date(2024, 1, 15)),
        end_date: Some(end),
        created_at: created,
        updated_at: created,
    }
}

fn courses(sarah: &User, michael: &User) -> [Course; 5] {
    [
        course(
            "course1",
            "Introduction to Computer Science",
            "CS101",
            "A comprehensive introduction to computer science fundamentals including programming, algorithms, and data structures.",
            sarah,
            (50, 35),
            ("16 weeks", 3, CourseLevel::Beginner),
            "Computer Science",
            date(2024, 5, 15),
        ),
        course(
            "course2",
            "Data Structures and Algorithms",
            "CS201",
            "Advanced study of data structures and algorithmic problem-solving techniques.",
            michael,
            (40, 28),
            ("16 weeks", 4, CourseLevel::Intermediate),
            "Computer Science",
            date(2024, 5, 15),
        ),
        course(
            "course3",
            "Web Development Fundamentals",
            "WEB101",
            "Learn HTML, CSS, JavaScript and modern web development practices.",
            sarah,
            (45, 42),
            ("12 weeks", 3, CourseLevel::Beginner),
            "Web Development",
            date(2024, 4, 15),
        ),
        course(
            "course4",
            "Database Management Systems",
            "DB201",
            "Comprehensive study of database design, implementation, and management.",
            michael,
            (35, 30),
            ("16 weeks", 4, CourseLevel::Intermediate),
            "Database",
            date(2024, 5, 15),
        ),
        course(
            "course5",
            "Machine Learning Basics",
            "ML301",
            "Introduction to machine learning algorithms and applications.",
            sarah,
            (30, 25),
            ("16 weeks", 4, CourseLevel::Advanced),
            "Machine Learning",
            date(2024, 5, 15),
        ),
    ]
}

fn enrollment(
    id: &str,
    student: &User,
    course: &Course,
    status: EnrollmentStatus,
    progress: u8,
    graded: Option<(&str, f64)>,
    updated: DateTime<Utc>,
) -> Enrollment {
    let enrolled = date(2024, 1, 15);
    Enrollment {
        id: EnrollmentId::new(id).unwrap_or_else(|_| EnrollmentId::generate()),
        student: student.student_summary(),
        course: course.summary(),
        status,
        progress,
        enrollment_date: enrolled,
        grade: graded.map(|(grade, _)| grade.to_string()),
        score: graded.map(|(_, score)| score),
        created_at: enrolled,
        updated_at: updated,
    }
}

#[allow(clippy::too_many_arguments)]
fn assignment(
    id: &str,
    title: &str,
    description: &str,
    course: &Course,
    due: DateTime<Utc>,
    max_points: u32,
    author: &User,
    created: DateTime<Utc>,
) -> Assignment {
    Assignment {
        id: AssignmentId::new(id).unwrap_or_else(|_| AssignmentId::generate()),
        title: title.to_string(),
        description: description.to_string(),
        course: course.summary(),
        due_date: due,
        max_points,
        status: AssignmentStatus::Active,
        created_by: AuthorSummary {
            id: Some(author.id.clone()),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
        },
        attachment: None,
        created_at: created,
        updated_at: created,
    }
}

fn material(
    id: &str,
    (title, description): (&str, &str),
    file_type: FileType,
    course: &Course,
    (file_name, original_name, size): (&str, &str, u64),
    author: &User,
    created: DateTime<Utc>,
) -> Material {
    Material {
        id: MaterialId::new(id).unwrap_or_else(|_| MaterialId::generate()),
        title: title.to_string(),
        description: description.to_string(),
        file_type,
        course: course.summary(),
        file: FileMeta {
            file_name: file_name.to_string(),
            original_name: original_name.to_string(),
            size,
            mime_type: None,
            url: Some(format!("/uploads/materials/{file_name}")),
        },
        uploaded_by: author.author_summary(),
        created_at: created,
        updated_at: created,
    }
}

fn result(
    id: &str,
    student: &User,
    course: &Course,
    (ca, exam): (Option<f64>, Option<f64>),
    graded: Option<(u8, LetterGrade)>,
    status: ResultStatus,
    updated: DateTime<Utc>,
) -> CourseResult {
    CourseResult {
        id: ResultId::new(id).unwrap_or_else(|_| ResultId::generate()),
        student: student.student_summary(),
        course: course.summary(),
        ca_score: ca,
        final_exam_score: exam,
        final_percentage: graded.map(|(p, _)| p),
        final_grade: graded.map(|(_, g)| g),
        status,
        created_at: date(2024, 1, 15),
        updated_at: updated,
    }
}

/// Build the demo dataset.
#[must_use]
pub fn demo() -> Dataset {
    let [admin, sarah, michael, john, jane, alex, emily, david] = users();
    let [cs101, cs201, web101, db201, ml301] = courses(&sarah, &michael);
    let (sarah, michael, john, jane, alex) = (&sarah, &michael, &john, &jane, &alex);
    let (cs101, cs201, web101, db201, ml301) = (&cs101, &cs201, &web101, &db201, &ml301);

    let march = date(2024, 3, 1);
    let enrollments = vec![
        enrollment("enrollment1", john, cs101, EnrollmentStatus::Active, 75, Some(("A", 92.0)), march),
        enrollment("enrollment2", john, cs201, EnrollmentStatus::Active, 60, None, march),
        enrollment("enrollment3", jane, cs101, EnrollmentStatus::Active, 80, Some(("A-", 88.0)), march),
        enrollment("enrollment4", jane, web101, EnrollmentStatus::Completed, 100, Some(("A+", 96.0)), date(2024, 4, 15)),
        enrollment("enrollment5", alex, cs201, EnrollmentStatus::Active, 45, None, march),
    ];

    let assignments = vec![
        assignment("assignment1", "Programming Assignment 1", "Implement basic data structures in Python", cs101, at(2024, 3, 15, 23, 59, 59), 100, sarah, date(2024, 2, 1)),
        assignment("assignment2", "Algorithm Analysis", "Analyze time complexity of given algorithms", cs201, at(2024, 3, 20, 23, 59, 59), 150, michael, date(2024, 2, 5)),
        assignment("assignment3", "HTML/CSS Portfolio", "Create a personal portfolio website using HTML and CSS", web101, at(2024, 3, 10, 23, 59, 59), 200, sarah, date(2024, 2, 1)),
        assignment("assignment4", "Database Design Project", "Design and implement a normalized database schema", db201, at(2024, 3, 25, 23, 59, 59), 250, michael, date(2024, 2, 10)),
        assignment("assignment5", "Linear Regression Implementation", "Implement linear regression from scratch", ml301, at(2024, 3, 30, 23, 59, 59), 300, sarah, date(2024, 2, 15)),
    ];

    let materials = vec![
        material(
            "material1",
            ("Introduction to Programming Concepts", "Comprehensive guide to programming fundamentals"),
            FileType::Pdf,
            cs101,
            ("intro_programming.pdf", "Introduction to Programming Concepts.pdf", 2_048_576),
            sarah,
            date(2024, 1, 20),
        ),
        material(
            "material2",
            ("Data Structures Overview", "Visual guide to common data structures"),
            FileType::Video,
            cs201,
            ("data_structures_overview.mp4", "Data Structures Overview.mp4", 52_428_800),
            michael,
            date(2024, 1, 25),
        ),
        material(
            "material3",
            ("HTML Best Practices", "Guidelines for writing clean HTML code"),
            FileType::Docx,
            web101,
            ("html_best_practices.docx", "HTML Best Practices.docx", 1_048_576),
            sarah,
            date(2024, 1, 30),
        ),
        material(
            "material4",
            ("Database Design Patterns", "Common patterns in database design"),
            FileType::Pdf,
            db201,
            ("db_design_patterns.pdf", "Database Design Patterns.pdf", 3_145_728),
            michael,
            date(2024, 2, 1),
        ),
    ];

    let results = vec![
        result("result1", john, cs101, (Some(88.0), Some(96.0)), Some((92, LetterGrade::A)), ResultStatus::Passed, date(2024, 5, 15)),
        result("result2", jane, web101, (Some(94.0), Some(98.0)), Some((96, LetterGrade::APlus)), ResultStatus::Passed, date(2024, 4, 15)),
        result("result3", john, cs201, (Some(85.0), None), None, ResultStatus::Pending, march),
    ];

    Dataset {
        users: vec![
            admin,
            sarah.clone(),
            michael.clone(),
            john.clone(),
            jane.clone(),
            alex.clone(),
            emily,
            david,
        ],
        courses: vec![
            cs101.clone(),
            cs201.clone(),
            web101.clone(),
            db201.clone(),
            ml301.clone(),
        ],
        enrollments,
        assignments,
        submissions: Vec::new(),
        materials,
        results,
    }
}
