//! Catalog service error taxonomy.
//!
//! # Responsibility
//! - Give every business-rule failure a typed, named outcome.
//! - Keep infrastructure failures distinguishable from business errors.
//!
//! # Invariants
//! - Business variants never carry SQL text or driver messages.
//! - Only `Storage` wraps a lower-layer error.

use crate::model::course::CourseId;
use crate::model::lesson::LessonId;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors returned by catalog services.
#[derive(Debug)]
pub enum CatalogError {
    /// Course does not exist or is soft-deleted.
    CourseNotFound(CourseId),
    /// Lesson does not exist or is soft-deleted.
    LessonNotFound(LessonId),
    /// Title is blank after normalization.
    InvalidTitle,
    /// Caller passed an ordering key from the reserved negative range.
    InvalidSortOrder(i64),
    /// Page index or size below one.
    InvalidPagination { page: u32, page_size: u32 },
    /// A live sibling already holds the requested order.
    OrderConflict { course_uuid: CourseId, sort_order: i64 },
    /// Reorder would leave two live lessons sharing one order.
    ResultingOrderConflict { course_uuid: CourseId, sort_order: i64 },
    /// Reorder request assigns one order value twice.
    DuplicateOrderValue(i64),
    /// Reorder request references one lesson twice.
    DuplicateLessonReference(LessonId),
    /// Reorder request references a lesson outside the target course.
    LessonNotInCourse {
        lesson_uuid: LessonId,
        course_uuid: CourseId,
    },
    /// Publish attempted on a course without live lessons.
    NoLessons(CourseId),
    /// Storage unique index rejected the write, typically a lost race.
    ConstraintViolation { course_uuid: CourseId, sort_order: i64 },
    /// Infrastructure failure. Opaque to callers.
    Storage(RepoError),
}

/// Stable machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogErrorKind {
    NotFound,
    InvalidInput,
    OrderConflict,
    ResultingOrderConflict,
    DuplicateOrderValue,
    DuplicateLessonReference,
    LessonNotInCourse,
    NoLessons,
    ConstraintViolation,
    Storage,
}

impl CatalogErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::OrderConflict => "order_conflict",
            Self::ResultingOrderConflict => "resulting_order_conflict",
            Self::DuplicateOrderValue => "duplicate_order_value",
            Self::DuplicateLessonReference => "duplicate_lesson_reference",
            Self::LessonNotInCourse => "lesson_not_in_course",
            Self::NoLessons => "no_lessons",
            Self::ConstraintViolation => "constraint_violation",
            Self::Storage => "storage",
        }
    }
}

impl CatalogError {
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            Self::CourseNotFound(_) | Self::LessonNotFound(_) => CatalogErrorKind::NotFound,
            Self::InvalidTitle | Self::InvalidSortOrder(_) | Self::InvalidPagination { .. } => {
                CatalogErrorKind::InvalidInput
            }
            Self::OrderConflict { .. } => CatalogErrorKind::OrderConflict,
            Self::ResultingOrderConflict { .. } => CatalogErrorKind::ResultingOrderConflict,
            Self::DuplicateOrderValue(_) => CatalogErrorKind::DuplicateOrderValue,
            Self::DuplicateLessonReference(_) => CatalogErrorKind::DuplicateLessonReference,
            Self::LessonNotInCourse { .. } => CatalogErrorKind::LessonNotInCourse,
            Self::NoLessons(_) => CatalogErrorKind::NoLessons,
            Self::ConstraintViolation { .. } => CatalogErrorKind::ConstraintViolation,
            Self::Storage(_) => CatalogErrorKind::Storage,
        }
    }

    /// `true` for rule violations the caller caused (4xx-equivalent).
    pub fn is_business(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// `true` when repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CourseNotFound(id) => write!(f, "course not found: {id}"),
            Self::LessonNotFound(id) => write!(f, "lesson not found: {id}"),
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::InvalidSortOrder(value) => {
                write!(f, "lesson order must be zero or greater, got {value}")
            }
            Self::InvalidPagination { page, page_size } => write!(
                f,
                "page and page size must be at least 1, got page={page} page_size={page_size}"
            ),
            Self::OrderConflict {
                course_uuid,
                sort_order,
            } => write!(
                f,
                "a lesson with order {sort_order} already exists in course {course_uuid}"
            ),
            Self::ResultingOrderConflict {
                course_uuid,
                sort_order,
            } => write!(
                f,
                "reorder would leave more than one lesson at order {sort_order} in course {course_uuid}"
            ),
            Self::DuplicateOrderValue(value) => {
                write!(f, "order value {value} is assigned more than once")
            }
            Self::DuplicateLessonReference(id) => {
                write!(f, "lesson {id} is referenced more than once")
            }
            Self::LessonNotInCourse {
                lesson_uuid,
                course_uuid,
            } => write!(
                f,
                "lesson {lesson_uuid} does not belong to course {course_uuid}"
            ),
            Self::NoLessons(id) => write!(f, "cannot publish course {id} without lessons"),
            Self::ConstraintViolation {
                course_uuid,
                sort_order,
            } => write!(
                f,
                "lesson order {sort_order} in course {course_uuid} was taken concurrently; retry"
            ),
            Self::Storage(_) => write!(f, "catalog storage failure"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CourseNotFound(id) => Self::CourseNotFound(id),
            RepoError::LessonNotFound(id) => Self::LessonNotFound(id),
            RepoError::ConstraintViolation {
                course_uuid,
                sort_order,
            } => Self::ConstraintViolation {
                course_uuid,
                sort_order,
            },
            RepoError::Validation(err) => err.into(),
            other => Self::Storage(other),
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::BlankTitle => Self::InvalidTitle,
            ValidationError::NegativeSortOrder(value) => Self::InvalidSortOrder(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, CatalogErrorKind};
    use crate::db::DbError;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_constraint_maps_to_retryable_business_error() {
        let course_uuid = Uuid::new_v4();
        let err: CatalogError = RepoError::ConstraintViolation {
            course_uuid,
            sort_order: 4,
        }
        .into();
        assert_eq!(err.kind(), CatalogErrorKind::ConstraintViolation);
        assert!(err.is_business());
        assert!(err.is_retryable());
    }

    #[test]
    fn storage_errors_are_opaque_and_not_business() {
        let err: CatalogError =
            RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery)).into();
        assert_eq!(err.kind(), CatalogErrorKind::Storage);
        assert!(!err.is_business());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "catalog storage failure");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn order_conflict_message_names_the_value() {
        let err = CatalogError::OrderConflict {
            course_uuid: Uuid::nil(),
            sort_order: 7,
        };
        assert!(err.to_string().contains("order 7"));
        assert_eq!(err.kind().as_str(), "order_conflict");
    }
}
