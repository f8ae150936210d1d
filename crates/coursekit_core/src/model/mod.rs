//! Catalog domain model.
//!
//! # Responsibility
//! - Define the course and lesson records used by core business logic.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Deletion is represented by soft-delete tombstones, not hard delete.
//! - Lesson ordering keys are non-negative; negative keys only exist
//!   transiently while a reorder is in flight.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course;
pub mod lesson;
pub mod title;

/// Field-level validation failure for catalog records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty after whitespace normalization.
    BlankTitle,
    /// Ordering key is below zero.
    NegativeSortOrder(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::NegativeSortOrder(value) => {
                write!(f, "lesson order must be zero or greater, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}
