//! Course domain model.
//!
//! # Responsibility
//! - Define the parent record whose lifecycle gates publication.
//! - Provide the status helper used by the publication gate.
//!
//! # Invariants
//! - New courses always start in `CourseStatus::Draft`.
//! - `is_deleted` is the source of truth for tombstone state.
//! - `updated_at >= created_at`; both are Unix epoch milliseconds.

use crate::db::now_epoch_ms;
use crate::model::title::normalize_title;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable course identifier.
pub type CourseId = Uuid;

/// Publication state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    /// Editable, not visible to learners.
    Draft,
    /// Visible to learners. Requires at least one live lesson to enter.
    Published,
}

/// Canonical course record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub uuid: CourseId,
    pub title: String,
    pub status: CourseStatus,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Course {
    /// Creates a draft course with a generated id and current timestamps.
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            status: CourseStatus::Draft,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks field-level rules before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match normalize_title(&self.title) {
            Some(_) => Ok(()),
            None => Err(ValidationError::BlankTitle),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }
}
