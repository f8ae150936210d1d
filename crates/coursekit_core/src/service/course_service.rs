//! Course lifecycle use-case service.
//!
//! # Responsibility
//! - Create, rename, and soft-delete courses.
//! - Gate the Draft -> Published transition on the live lesson set.
//!
//! # Invariants
//! - New courses start in Draft.
//! - Publish requires at least one live lesson at transition time. Deleting
//!   lessons later does not demote a published course.
//! - Unpublish has no precondition beyond the course being live.
//! - Course soft-delete does not cascade to lessons.

use crate::model::course::{Course, CourseId, CourseStatus};
use crate::model::title::normalize_title;
use crate::repo::course_repo::CourseRepository;
use crate::repo::lesson_repo::LessonRepository;
use crate::service::error::CatalogError;
use log::{info, warn};

/// Course lifecycle service facade.
pub struct CourseService<C: CourseRepository, L: LessonRepository> {
    courses: C,
    lessons: L,
}

impl<C: CourseRepository, L: LessonRepository> CourseService<C, L> {
    /// Creates service from repository implementations.
    pub fn new(courses: C, lessons: L) -> Self {
        Self { courses, lessons }
    }

    /// Creates one draft course.
    pub fn create_course(&self, title: impl Into<String>) -> Result<Course, CatalogError> {
        let title = normalize_title(&title.into()).ok_or(CatalogError::InvalidTitle)?;
        let course = Course::new(title);
        self.courses.create_course(&course)?;
        info!(
            "event=course_create module=service status=ok course_uuid={}",
            course.uuid
        );
        Ok(course)
    }

    /// Replaces the title of one live course.
    pub fn rename_course(
        &self,
        course_uuid: CourseId,
        title: impl Into<String>,
    ) -> Result<Course, CatalogError> {
        let title = normalize_title(&title.into()).ok_or(CatalogError::InvalidTitle)?;
        let mut course = self.load_live(course_uuid)?;
        course.title = title;
        self.courses.update_course(&course).map_err(Into::into)
    }

    /// Moves a course to Published.
    ///
    /// Publishing an already published course succeeds without a write, as
    /// long as it still has live lessons.
    ///
    /// # Errors
    /// - `CourseNotFound` when missing or soft-deleted.
    /// - `NoLessons` when the course has no live lesson.
    pub fn publish(&self, course_uuid: CourseId) -> Result<Course, CatalogError> {
        let mut course = self.load_live(course_uuid)?;

        let live_lessons = self.lessons.count_live_lessons(course_uuid)?;
        if live_lessons == 0 {
            warn!(
                "event=course_publish module=service status=rejected course_uuid={} reason=no_lessons",
                course_uuid
            );
            return Err(CatalogError::NoLessons(course_uuid));
        }

        if course.is_published() {
            return Ok(course);
        }

        course.status = CourseStatus::Published;
        let stored = self.courses.update_course(&course)?;
        info!(
            "event=course_publish module=service status=ok course_uuid={} live_lessons={}",
            course_uuid, live_lessons
        );
        Ok(stored)
    }

    /// Moves a course back to Draft. Always legal for a live course.
    pub fn unpublish(&self, course_uuid: CourseId) -> Result<Course, CatalogError> {
        let mut course = self.load_live(course_uuid)?;
        if course.status == CourseStatus::Draft {
            return Ok(course);
        }

        course.status = CourseStatus::Draft;
        let stored = self.courses.update_course(&course)?;
        info!(
            "event=course_unpublish module=service status=ok course_uuid={}",
            course_uuid
        );
        Ok(stored)
    }

    /// Soft-deletes one live course. Its lessons stay live.
    pub fn delete_course(&self, course_uuid: CourseId) -> Result<(), CatalogError> {
        self.load_live(course_uuid)?;
        self.courses.soft_delete_course(course_uuid)?;
        info!(
            "event=course_delete module=service status=ok course_uuid={}",
            course_uuid
        );
        Ok(())
    }

    fn load_live(&self, course_uuid: CourseId) -> Result<Course, CatalogError> {
        self.courses
            .get_course(course_uuid, false)?
            .ok_or(CatalogError::CourseNotFound(course_uuid))
    }
}
