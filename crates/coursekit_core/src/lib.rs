//! Core domain logic for the course catalog.
//! This crate is the single source of truth for lesson ordering and course
//! publication invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CatalogConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::course::{Course, CourseId, CourseStatus};
pub use model::lesson::{Lesson, LessonId};
pub use model::ValidationError;
pub use repo::course_repo::{
    CourseListQuery, CourseListing, CourseRepository, SqliteCourseRepository,
};
pub use repo::lesson_repo::{LessonRepository, SqliteLessonRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_query::{CatalogQuery, CoursePage, CourseSummary};
pub use service::course_service::CourseService;
pub use service::error::{CatalogError, CatalogErrorKind};
pub use service::lesson_service::{LessonOrderAssignment, LessonService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
