//! Durable todo storage backed by SQLite through `sqlx`.
//!
//! # Design
//! `TodoStore` owns a connection pool handed to it at construction; nothing
//! is process-global, so every test can open its own in-memory database.
//! Read-modify-write operations (`update`, `toggle`) run inside a
//! `BEGIN IMMEDIATE` transaction and roll back on every early return,
//! including `NotFound`. Taking the write lock before the read means two
//! writers queue on the busy timeout instead of one failing its lock
//! upgrade with `SQLITE_BUSY`.
//!
//! Timestamps are written as fixed-width UTC text with microsecond
//! precision. Lexical order of that text is chronological order, which is
//! what `list_all` sorts on.

use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};

use crate::error::{Result, TodoError};
use crate::types::{NewTodo, Todo, TodoPatch};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(255) NOT NULL,
        description TEXT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS ix_todos_title ON todos (title)",
    "CREATE INDEX IF NOT EXISTS ix_todos_completed ON todos (completed)",
    "CREATE INDEX IF NOT EXISTS ix_todos_completed_title ON todos (completed, title)",
];

const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// How long a writer waits for another connection's lock.
const BUSY_TIMEOUT: StdDuration = StdDuration::from_secs(5);

const SELECT_BY_ID: &str = "SELECT id, title, description, completed, created_at, updated_at \
     FROM todos WHERE id = ?";

const SELECT_ALL: &str = "SELECT id, title, description, completed, created_at, updated_at \
     FROM todos ORDER BY created_at ASC, id ASC";

/// Pool-backed store for `Todo` rows.
#[derive(Debug, Clone)]
pub struct TodoStore {
    pool: SqlitePool,
}

impl TodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`, creating the database file if needed.
    /// Call [`TodoStore::migrate`] before first use.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        tracing::debug!(url, max_connections, "opened sqlite pool");
        Ok(Self::new(pool))
    }

    /// A private, already-migrated in-memory database.
    ///
    /// Every SQLite memory connection is its own database, so the pool is
    /// pinned to one connection that is never reaped.
    pub async fn in_memory() -> Result<Self> {
        let options =
            SqliteConnectOptions::from_str("sqlite::memory:")?.busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create the `todos` table and its indexes if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn create(&self, new: NewTodo) -> Result<Todo> {
        let now = now();
        let completed = new.completed.unwrap_or(false);
        let id = sqlx::query(
            "INSERT INTO todos (title, description, completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(completed)
        .bind(stamp(now))
        .bind(stamp(now))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::debug!(id, "inserted todo");
        Ok(Todo {
            id,
            title: new.title,
            description: new.description,
            completed,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Todo> {
        sqlx::query_as::<_, Todo>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(TodoError::NotFound(id))
    }

    /// Every todo, oldest first. Equal creation times fall back to id order.
    pub async fn list_all(&self) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(count = todos.len(), "listed todos");
        Ok(todos)
    }

    /// Merge `patch` into the stored todo and refresh `updated_at`.
    pub async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;
        let mut todo = fetch(&mut tx, id).await?;
        patch.apply(&mut todo);
        todo.updated_at = next_updated_at(todo.updated_at);
        write(&mut tx, &todo).await?;
        tx.commit().await?;

        tracing::debug!(id, "updated todo");
        Ok(todo)
    }

    /// Flip `completed` and refresh `updated_at`.
    pub async fn toggle(&self, id: i64) -> Result<Todo> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;
        let mut todo = fetch(&mut tx, id).await?;
        todo.completed = !todo.completed;
        todo.updated_at = next_updated_at(todo.updated_at);
        write(&mut tx, &todo).await?;
        tx.commit().await?;

        tracing::debug!(id, completed = todo.completed, "toggled todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(TodoError::NotFound(id));
        }
        tracing::debug!(id, "deleted todo");
        Ok(())
    }
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> Result<Todo> {
    sqlx::query_as::<_, Todo>(SELECT_BY_ID)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(TodoError::NotFound(id))
}

async fn write(conn: &mut SqliteConnection, todo: &Todo) -> Result<()> {
    sqlx::query(
        "UPDATE todos SET title = ?, description = ?, completed = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&todo.title)
    .bind(&todo.description)
    .bind(todo.completed)
    .bind(stamp(todo.updated_at))
    .bind(todo.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Current time at the precision the table keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Strictly after `previous`, even if the clock has not moved since.
fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
