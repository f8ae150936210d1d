//! Core use-case services.
//!
//! # Responsibility
//! - Encode catalog business rules on top of repository contracts.
//! - Return typed `CatalogError` outcomes; nothing below the service layer
//!   leaks to callers except the opaque `Storage` variant.
//!
//! # Invariants
//! - Services receive repositories through constructors; there is no
//!   process-wide store handle.

pub mod catalog_query;
pub mod course_service;
pub mod error;
pub mod lesson_service;
