//! Lesson domain model.
//!
//! # Responsibility
//! - Define the ordered child record owned by one course.
//!
//! # Invariants
//! - `course_uuid` never changes after creation.
//! - Among live lessons of one course, `sort_order` is unique. The storage
//!   layer enforces this with a partial unique index.
//! - Caller-supplied `sort_order` values are non-negative.

use crate::db::now_epoch_ms;
use crate::model::course::CourseId;
use crate::model::title::normalize_title;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable lesson identifier.
pub type LessonId = Uuid;

/// Canonical lesson record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub uuid: LessonId,
    /// Owning course. Immutable.
    pub course_uuid: CourseId,
    pub title: String,
    /// Position within the course, ascending.
    pub sort_order: i64,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Lesson {
    /// Creates a live lesson with a generated id and current timestamps.
    pub fn new(course_uuid: CourseId, title: impl Into<String>, sort_order: i64) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            course_uuid,
            title: title.into(),
            sort_order,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks storage-level rules.
    ///
    /// Does not check `sort_order`: the repository must accept the reserved
    /// negative range while a reorder is between passes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match normalize_title(&self.title) {
            Some(_) => Ok(()),
            None => Err(ValidationError::BlankTitle),
        }
    }
}

/// Rejects ordering keys from the reserved negative range.
pub fn validate_sort_order(sort_order: i64) -> Result<(), ValidationError> {
    if sort_order < 0 {
        return Err(ValidationError::NegativeSortOrder(sort_order));
    }
    Ok(())
}
