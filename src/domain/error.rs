//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Calendar domain errors
///
/// A missing record is the only failure the calendar itself defines.
/// Authentication, CSRF and malformed input are rejected before a handler runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No category with the requested id
    #[error("Category not found.")]
    CategoryNotFound(i64),

    /// No event with the requested id
    #[error("Event not found.")]
    EventNotFound(i64),
}

impl DomainError {
    /// Id that could not be resolved
    pub fn missing_id(&self) -> i64 {
        match self {
            Self::CategoryNotFound(id) | Self::EventNotFound(id) => *id,
        }
    }
}
