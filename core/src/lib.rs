//! Domain core for the todo service.
//!
//! # Overview
//! Owns the `Todo` entity, its SQLite-backed store and the service that
//! validates payloads before they reach storage. Nothing here knows about
//! HTTP; the server crate maps requests onto `TodoService` calls.
//!
//! # Design
//! - `TodoStore` wraps an injected `SqlitePool`; no global connection state.
//! - `TodoService` holds the store and applies validation and logging.
//! - Partial updates go through `TodoPatch::apply`, an explicit field-level
//!   merge.
//! - Concurrent writes to the same id are last-write-wins. There is no
//!   version column.

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::{FieldError, Result, StorageError, TodoError};
pub use service::{validate_title, TodoService, TITLE_MAX_CHARS};
pub use store::TodoStore;
pub use types::{NewTodo, Todo, TodoPatch};
