//! Lesson ordering use-case service.
//!
//! # Responsibility
//! - Create, edit, soft-delete, and reorder lessons of one course.
//! - Answer order collisions with typed business errors before storage does.
//!
//! # Invariants
//! - Among live lessons of one course, `sort_order` is unique. Pre-flight
//!   checks here are fast-fail only; the partial unique index is the final
//!   authority and a lost race surfaces as `ConstraintViolation`.
//! - Reorder writes every live lesson twice: first to a disjoint negative
//!   range, then to its final key. Each pass is one commit.
//! - A failed second pass leaves the first pass committed.

use crate::model::course::CourseId;
use crate::model::lesson::{validate_sort_order, Lesson, LessonId};
use crate::model::title::normalize_title;
use crate::repo::course_repo::CourseRepository;
use crate::repo::lesson_repo::LessonRepository;
use crate::service::error::CatalogError;
use log::{error, info, warn};
use std::collections::{HashMap, HashSet};

/// One requested `(lesson, new order)` pair for `reorder_lessons`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonOrderAssignment {
    pub lesson_uuid: LessonId,
    pub sort_order: i64,
}

impl LessonOrderAssignment {
    pub fn new(lesson_uuid: LessonId, sort_order: i64) -> Self {
        Self {
            lesson_uuid,
            sort_order,
        }
    }
}

/// Lesson ordering service facade.
pub struct LessonService<C: CourseRepository, L: LessonRepository> {
    courses: C,
    lessons: L,
}

impl<C: CourseRepository, L: LessonRepository> LessonService<C, L> {
    /// Creates service from repository implementations.
    pub fn new(courses: C, lessons: L) -> Self {
        Self { courses, lessons }
    }

    /// Creates one lesson at `sort_order` under a live course.
    ///
    /// # Errors
    /// - `InvalidTitle`, `InvalidSortOrder` for malformed input.
    /// - `CourseNotFound` when the course is missing or soft-deleted.
    /// - `OrderConflict` when a live sibling already holds `sort_order`.
    /// - `ConstraintViolation` when a concurrent writer took the order first.
    pub fn create_lesson(
        &self,
        course_uuid: CourseId,
        title: impl Into<String>,
        sort_order: i64,
    ) -> Result<Lesson, CatalogError> {
        let title = normalize_lesson_title(title.into())?;
        validate_sort_order(sort_order)?;
        self.ensure_live_course(course_uuid)?;

        if self.lessons.is_order_taken(course_uuid, sort_order, None)? {
            return Err(CatalogError::OrderConflict {
                course_uuid,
                sort_order,
            });
        }

        let lesson = Lesson::new(course_uuid, title, sort_order);
        if let Err(err) = self.lessons.create_lesson(&lesson) {
            error!(
                "event=lesson_create module=service status=error course_uuid={} sort_order={} error={}",
                course_uuid, sort_order, err
            );
            return Err(err.into());
        }

        info!(
            "event=lesson_create module=service status=ok course_uuid={} lesson_uuid={} sort_order={}",
            course_uuid, lesson.uuid, sort_order
        );
        Ok(lesson)
    }

    /// Replaces title and order of one live lesson.
    ///
    /// Keeping the lesson's own current order is never a conflict.
    pub fn update_lesson(
        &self,
        lesson_uuid: LessonId,
        title: impl Into<String>,
        sort_order: i64,
    ) -> Result<Lesson, CatalogError> {
        let title = normalize_lesson_title(title.into())?;
        validate_sort_order(sort_order)?;

        let mut lesson = self.get_lesson(lesson_uuid)?;
        if self
            .lessons
            .is_order_taken(lesson.course_uuid, sort_order, Some(lesson_uuid))?
        {
            return Err(CatalogError::OrderConflict {
                course_uuid: lesson.course_uuid,
                sort_order,
            });
        }

        lesson.title = title;
        lesson.sort_order = sort_order;
        let stored = self.lessons.update_lesson(&lesson)?;
        info!(
            "event=lesson_update module=service status=ok course_uuid={} lesson_uuid={} sort_order={}",
            stored.course_uuid, lesson_uuid, sort_order
        );
        Ok(stored)
    }

    /// Soft-deletes one live lesson and frees its order.
    ///
    /// Does not touch the owning course's publication state.
    pub fn delete_lesson(&self, lesson_uuid: LessonId) -> Result<(), CatalogError> {
        let lesson = self.get_lesson(lesson_uuid)?;
        self.lessons.soft_delete_lesson(lesson_uuid)?;
        info!(
            "event=lesson_delete module=service status=ok course_uuid={} lesson_uuid={} freed_order={}",
            lesson.course_uuid, lesson_uuid, lesson.sort_order
        );
        Ok(())
    }

    /// Loads one live lesson.
    pub fn get_lesson(&self, lesson_uuid: LessonId) -> Result<Lesson, CatalogError> {
        self.lessons
            .get_lesson(lesson_uuid, false)?
            .ok_or(CatalogError::LessonNotFound(lesson_uuid))
    }

    /// Reassigns orders of a subset of a course's live lessons.
    ///
    /// Lessons not named in `assignments` keep their current order. Returns
    /// all live lessons of the course in their final order.
    ///
    /// # Errors
    /// - `DuplicateOrderValue` / `DuplicateLessonReference` for malformed
    ///   requests; nothing is written. Checked before anything else.
    /// - `InvalidSortOrder` for a negative target.
    /// - `CourseNotFound` when the course is missing or soft-deleted.
    /// - `LessonNotInCourse` when a referenced lesson is not a live lesson of
    ///   the course.
    /// - `ResultingOrderConflict` when a reordered lesson would collide with
    ///   one that was not mentioned.
    /// - `ConstraintViolation` when a concurrent writer interfered; retryable.
    ///   A second-pass failure of any other kind surfaces as `Storage`.
    pub fn reorder_lessons(
        &self,
        course_uuid: CourseId,
        assignments: &[LessonOrderAssignment],
    ) -> Result<Vec<Lesson>, CatalogError> {
        reject_duplicate_assignments(assignments)?;
        for assignment in assignments {
            validate_sort_order(assignment.sort_order)?;
        }
        self.ensure_live_course(course_uuid)?;

        let current = self.lessons.list_lessons(course_uuid, false)?;
        if assignments.is_empty() {
            return Ok(current);
        }

        let targets = order_pairs(&plan_final_orders(course_uuid, &current, assignments)?);
        let staged = order_pairs(&plan_staging_orders(&current));

        info!(
            "event=lesson_reorder module=service status=start course_uuid={} live_lessons={} assignments={}",
            course_uuid,
            current.len(),
            assignments.len()
        );

        if let Err(err) = self.lessons.update_lesson_orders(course_uuid, &staged) {
            error!(
                "event=lesson_reorder module=service status=error course_uuid={} pass=staging error={}",
                course_uuid, err
            );
            return Err(err.into());
        }

        if let Err(err) = self.lessons.update_lesson_orders(course_uuid, &targets) {
            warn!(
                "event=lesson_reorder module=service status=error course_uuid={} pass=final staging_committed=true error={}",
                course_uuid, err
            );
            return Err(err.into());
        }

        info!(
            "event=lesson_reorder module=service status=ok course_uuid={}",
            course_uuid
        );
        self.lessons
            .list_lessons(course_uuid, false)
            .map_err(Into::into)
    }

    fn ensure_live_course(&self, course_uuid: CourseId) -> Result<(), CatalogError> {
        self.courses
            .get_course(course_uuid, false)?
            .ok_or(CatalogError::CourseNotFound(course_uuid))?;
        Ok(())
    }
}

fn normalize_lesson_title(value: String) -> Result<String, CatalogError> {
    normalize_title(&value).ok_or(CatalogError::InvalidTitle)
}

fn reject_duplicate_assignments(assignments: &[LessonOrderAssignment]) -> Result<(), CatalogError> {
    let mut seen_orders = HashSet::new();
    for assignment in assignments {
        if !seen_orders.insert(assignment.sort_order) {
            return Err(CatalogError::DuplicateOrderValue(assignment.sort_order));
        }
    }

    let mut seen_lessons = HashSet::new();
    for assignment in assignments {
        if !seen_lessons.insert(assignment.lesson_uuid) {
            return Err(CatalogError::DuplicateLessonReference(
                assignment.lesson_uuid,
            ));
        }
    }
    Ok(())
}

/// Applies `assignments` in memory and checks the whole course for collisions.
fn plan_final_orders(
    course_uuid: CourseId,
    current: &[Lesson],
    assignments: &[LessonOrderAssignment],
) -> Result<Vec<Lesson>, CatalogError> {
    let requested: HashMap<LessonId, i64> = assignments
        .iter()
        .map(|assignment| (assignment.lesson_uuid, assignment.sort_order))
        .collect();

    let live_ids: HashSet<LessonId> = current.iter().map(|lesson| lesson.uuid).collect();
    if let Some(missing) = assignments
        .iter()
        .find(|assignment| !live_ids.contains(&assignment.lesson_uuid))
    {
        return Err(CatalogError::LessonNotInCourse {
            lesson_uuid: missing.lesson_uuid,
            course_uuid,
        });
    }

    let mut targets = current.to_vec();
    for lesson in &mut targets {
        if let Some(sort_order) = requested.get(&lesson.uuid) {
            lesson.sort_order = *sort_order;
        }
    }

    let mut taken = HashSet::new();
    for lesson in &targets {
        if !taken.insert(lesson.sort_order) {
            return Err(CatalogError::ResultingOrderConflict {
                course_uuid,
                sort_order: lesson.sort_order,
            });
        }
    }
    Ok(targets)
}

/// Moves every live lesson below the smallest key currently in use.
///
/// Staged keys are distinct and strictly lower than any stored or target key,
/// so neither pass can collide with a row it has not rewritten yet.
fn plan_staging_orders(current: &[Lesson]) -> Vec<Lesson> {
    let floor = current
        .iter()
        .map(|lesson| lesson.sort_order)
        .min()
        .unwrap_or(0)
        .min(0);

    current
        .iter()
        .zip(1_i64..)
        .map(|(lesson, offset)| {
            let mut staged = lesson.clone();
            staged.sort_order = floor - offset;
            staged
        })
        .collect()
}

fn order_pairs(lessons: &[Lesson]) -> Vec<(LessonId, i64)> {
    lessons
        .iter()
        .map(|lesson| (lesson.uuid, lesson.sort_order))
        .collect()
}
