//! Error types for the todo core.
//!
//! # Design
//! `NotFound` gets a dedicated variant because every id-addressed operation
//! must report it before touching storage. Validation failures carry the
//! offending field so the HTTP layer can render field-level detail. Anything
//! the storage engine reports lands in `Storage` untouched.

use std::fmt;

/// The storage engine's own error type.
pub use sqlx::Error as StorageError;

/// Errors returned by `TodoStore` and `TodoService`.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// No todo with this id exists (never created, or already deleted).
    #[error("Todo with id={0} not found")]
    NotFound(i64),

    /// The payload broke a field constraint. Never reaches the store.
    #[error("validation failed: {0}")]
    Validation(FieldError),

    /// The storage engine failed (connection, I/O, constraint).
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
