//! Read-side catalog facade.
//!
//! # Responsibility
//! - Paged, filtered course listing.
//! - Live lesson listing and course summaries.
//!
//! # Invariants
//! - Soft-deleted rows never appear. A deleted course does not hide its
//!   live lessons.
//! - Course pages are ordered newest first; lessons by `sort_order ASC`.
//! - Invalid page windows are rejected, never clamped.

use crate::model::course::{Course, CourseId, CourseStatus};
use crate::model::lesson::Lesson;
use crate::model::title::normalize_title;
use crate::repo::course_repo::{CourseListQuery, CourseRepository};
use crate::repo::lesson_repo::LessonRepository;
use crate::service::error::CatalogError;
use serde::Serialize;

/// One page of courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoursePage {
    pub items: Vec<Course>,
    /// Matches across all pages.
    pub total_count: u64,
    /// 1-based page index echoed from the request.
    pub page: u32,
    pub page_size: u32,
}

/// Compact course overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub course_uuid: CourseId,
    pub title: String,
    pub live_lesson_count: u64,
    /// Course's own `updated_at`; equals `created_at` until first update.
    pub last_modified: i64,
}

/// Query service over courses and lessons.
pub struct CatalogQuery<C: CourseRepository, L: LessonRepository> {
    courses: C,
    lessons: L,
}

impl<C: CourseRepository, L: LessonRepository> CatalogQuery<C, L> {
    pub fn new(courses: C, lessons: L) -> Self {
        Self { courses, lessons }
    }

    /// Lists live courses.
    ///
    /// `text_filter` is a case-insensitive substring on the title; blank
    /// filters are ignored. `page` is 1-based.
    ///
    /// # Errors
    /// - `InvalidPagination` when `page < 1` or `page_size < 1`.
    pub fn list_courses(
        &self,
        text_filter: Option<&str>,
        status_filter: Option<CourseStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<CoursePage, CatalogError> {
        if page < 1 || page_size < 1 {
            return Err(CatalogError::InvalidPagination { page, page_size });
        }

        let query = CourseListQuery {
            title_contains: text_filter.and_then(normalize_title),
            status: status_filter,
            limit: page_size,
            offset: u64::from(page - 1) * u64::from(page_size),
        };
        let listing = self.courses.list_courses(&query)?;

        Ok(CoursePage {
            items: listing.items,
            total_count: listing.total_count,
            page,
            page_size,
        })
    }

    /// Loads one live course.
    pub fn get_course(&self, course_uuid: CourseId) -> Result<Course, CatalogError> {
        self.courses
            .get_course(course_uuid, false)?
            .ok_or(CatalogError::CourseNotFound(course_uuid))
    }

    /// Lists live lessons of a course by ascending order.
    ///
    /// Course soft-delete does not cascade, so lessons of a deleted course
    /// are still listed. Only ids that were never stored are rejected.
    pub fn list_lessons(&self, course_uuid: CourseId) -> Result<Vec<Lesson>, CatalogError> {
        self.courses
            .get_course(course_uuid, true)?
            .ok_or(CatalogError::CourseNotFound(course_uuid))?;
        self.lessons
            .list_lessons(course_uuid, false)
            .map_err(Into::into)
    }

    /// Summarizes one live course.
    pub fn summarize(&self, course_uuid: CourseId) -> Result<CourseSummary, CatalogError> {
        let course = self.get_course(course_uuid)?;
        let live_lesson_count = self.lessons.count_live_lessons(course_uuid)?;
        Ok(CourseSummary {
            course_uuid,
            title: course.title,
            live_lesson_count,
            last_modified: course.updated_at.max(course.created_at),
        })
    }
}
