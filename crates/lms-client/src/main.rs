//! lmsctl - command-line access to the LMS gateway.
//!
//! The session is kept in a JSON credentials file between invocations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lms_client::{FileCredentials, LmsClient};
use lms_core::{PageRequest, Role};
use serde_json::Value;

/// lmsctl - command-line access to the LMS gateway.
#[derive(Parser, Debug)]
#[command(name = "lmsctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gateway URL.
    #[arg(long, env = "LMS_GATEWAY", default_value = "http://localhost:5000")]
    gateway: String,

    /// Credentials file. Defaults to `$HOME/.lms/credentials.json`.
    #[arg(long, env = "LMS_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        #[arg(long, env = "LMS_PASSWORD")]
        password: String,
        /// Portal to log into: admin, instructor or student.
        #[arg(long, default_value = "student")]
        role: Role,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Me,
    /// List courses.
    Courses {
        /// Only courses with a free seat.
        #[arg(long)]
        available: bool,
        /// Page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Enroll the logged-in student in a course.
    Enroll {
        /// Course identifier.
        course_id: String,
    },
    /// List the logged-in student's enrollments.
    MyEnrollments,
    /// GET any API path and print the payload.
    Get {
        /// Path such as `/api/dashboard/stats`.
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter("lms_client=debug,warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let path = args.credentials.unwrap_or_else(FileCredentials::default_path);
    let client = LmsClient::with_credentials(&args.gateway, FileCredentials::new(path));

    match args.command {
        Command::Login {
            email,
            password,
            role,
        } => {
            let login = client.login(&email, &password, role).await?;
            println!("Logged in as {} ({})", login.user.full_name(), login.user.role);
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
        }
        Command::Me => {
            let me = client.me().await?;
            println!("{} <{}> {} [{}]", me.full_name(), me.email, me.role, me.id);
        }
        Command::Courses {
            available,
            page,
            limit,
        } => {
            let (courses, pagination) = if available {
                (client.available_courses().await?, None)
            } else {
                client.courses(PageRequest::new(page, limit)).await?
            };
            for course in &courses {
                println!(
                    "{:<10} {:<40} {:>3}/{:<3} {}",
                    course.code, course.title, course.enrolled, course.capacity, course.id
                );
            }
            if let Some(p) = pagination {
                println!("page {} of {} ({} courses)", p.page, p.pages, p.total);
            }
        }
        Command::Enroll { course_id } => {
            let enrollment = client.enroll(&course_id).await?;
            println!(
                "Enrolled in {} {} [{}]",
                enrollment.course.code, enrollment.course.title, enrollment.id
            );
        }
        Command::MyEnrollments => {
            for enrollment in client.my_enrollments().await? {
                println!(
                    "{:<10} {:<40} {:<10} {:>3}%",
                    enrollment.course.code,
                    enrollment.course.title,
                    enrollment.status,
                    enrollment.progress
                );
            }
        }
        Command::Get { path } => {
            let data: Value = client.get(&path).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}
