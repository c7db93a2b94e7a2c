//! REST surface for the todo service.
//!
//! Handlers are thin: they extract, call `TodoService`, and let `ApiError`
//! render failures. All state lives in the injected service.

use std::future::Future;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use todo_core::{NewTodo, Todo, TodoPatch, TodoService};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extract;

pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use extract::TodoId;

#[derive(Debug, Serialize)]
pub struct Health {
    pub message: &'static str,
}

pub fn app(service: TodoService) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/todos/{id}/toggle", patch(toggle_todo))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(service)
}

/// Serve `app(service)` on `listener` until `shutdown` resolves.
pub async fn run<F>(
    listener: TcpListener,
    service: TodoService,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> Json<Health> {
    Json(Health { message: "Healthy" })
}

async fn list_todos(State(service): State<TodoService>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(service.list().await?))
}

async fn create_todo(
    State(service): State<TodoService>,
    input: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = input?;
    let todo = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(service): State<TodoService>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>, ApiError> {
    Ok(Json(service.get(id).await?))
}

async fn update_todo(
    State(service): State<TodoService>,
    TodoId(id): TodoId,
    input: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(patch) = input?;
    Ok(Json(service.update(id, patch).await?))
}

async fn toggle_todo(
    State(service): State<TodoService>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>, ApiError> {
    Ok(Json(service.toggle(id).await?))
}

async fn delete_todo(
    State(service): State<TodoService>,
    TodoId(id): TodoId,
) -> Result<StatusCode, ApiError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_message() {
        let json = serde_json::to_value(Health { message: "Healthy" }).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Healthy"}));
    }

    #[test]
    fn patch_accepts_any_subset_of_fields() {
        let patch: TodoPatch = serde_json::from_str(r#"{"title":"New title"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert!(patch.description.is_none());
        assert!(patch.completed.is_none());
    }
}
