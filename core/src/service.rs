//! Business rules layered over `TodoStore`.
//!
//! Payloads are validated here, before any storage access. Id-addressed
//! operations rely on the store to resolve the id first and report
//! `NotFound` without side effects.

use crate::error::{FieldError, Result, TodoError};
use crate::store::TodoStore;
use crate::types::{NewTodo, Todo, TodoPatch};

/// Upper bound on a title, counted in characters.
pub const TITLE_MAX_CHARS: usize = 255;

#[derive(Debug, Clone)]
pub struct TodoService {
    store: TodoStore,
}

impl TodoService {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>> {
        self.store.list_all().await
    }

    pub async fn create(&self, new: NewTodo) -> Result<Todo> {
        validate_title(&new.title)?;
        let todo = self.store.create(new).await?;
        tracing::info!(id = todo.id, "created todo");
        Ok(todo)
    }

    pub async fn get(&self, id: i64) -> Result<Todo> {
        self.store.get(id).await
    }

    pub async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        let todo = self.store.update(id, patch).await?;
        tracing::info!(id, "updated todo");
        Ok(todo)
    }

    pub async fn toggle(&self, id: i64) -> Result<Todo> {
        let todo = self.store.toggle(id).await?;
        tracing::info!(id, completed = todo.completed, "toggled todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(id, "deleted todo");
        Ok(())
    }
}

/// Length bounds only. Whitespace is not trimmed, so `"   "` is a valid
/// title.
pub fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 {
        return Err(TodoError::Validation(FieldError::new(
            "title",
            "String should have at least 1 character",
        )));
    }
    if len > TITLE_MAX_CHARS {
        return Err(TodoError::Validation(FieldError::new(
            "title",
            format!("String should have at most {TITLE_MAX_CHARS} characters"),
        )));
    }
    Ok(())
}
