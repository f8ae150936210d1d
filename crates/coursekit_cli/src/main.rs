//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `coursekit_core` linkage and schema bootstrap without a host app.
//! - Print a deterministic overview of the first page of courses.
//!
//! Usage: `coursekit_cli [DB_PATH]`. Without a path an in-memory database is
//! used, which only proves that migrations apply.

use coursekit_core::db::{open_db, open_db_in_memory};
use coursekit_core::{CatalogQuery, SqliteCourseRepository, SqliteLessonRepository};
use std::process::ExitCode;

const OVERVIEW_PAGE_SIZE: u32 = 20;

fn main() -> ExitCode {
    println!("coursekit_core ping={}", coursekit_core::ping());
    println!("coursekit_core version={}", coursekit_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), String> {
    let conn = match db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;

    let courses = SqliteCourseRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let lessons = SqliteLessonRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let query = CatalogQuery::new(courses, lessons);

    let page = query
        .list_courses(None, None, 1, OVERVIEW_PAGE_SIZE)
        .map_err(|err| err.to_string())?;
    println!("courses total={}", page.total_count);

    for course in &page.items {
        let summary = query.summarize(course.uuid).map_err(|err| err.to_string())?;
        println!(
            "course uuid={} status={:?} lessons={} last_modified={} title={}",
            summary.course_uuid,
            course.status,
            summary.live_lesson_count,
            summary.last_modified,
            summary.title
        );
    }
    Ok(())
}
