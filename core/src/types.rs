//! Domain types for the todo service.
//!
//! # Design
//! `Todo` is the persisted entity and maps straight onto a `todos` row via
//! `sqlx::FromRow`. The two payload types describe what a caller may send:
//! `NewTodo` for creation and `TodoPatch` for partial updates. `TodoPatch`
//! keeps "field omitted" and "field sent as null" apart for `description`,
//! which is the only nullable column a caller can clear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single todo item as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields keep their stored value.
///
/// `description` is doubly optional: `None` leaves it alone, `Some(None)`
/// clears it, `Some(Some(_))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// True when the caller supplied none of the mutable fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Merge the supplied fields into `todo`. Identity and timestamps are
    /// left to the store.
    pub fn apply(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// Runs only when the key exists, so an explicit `null` becomes `Some(None)`
/// while a missing key falls back to `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
