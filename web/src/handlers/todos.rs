//! The `/todos` resource.
//!
//! | Method | Input | Success |
//! |---|---|---|
//! | GET | `?completed=<value>` | 200, array of todos |
//! | POST | `{text, completed?}` | 201, created todo |
//! | PUT | `{id, text?, completed?}` | 200, updated todo |
//! | DELETE | `?id=<id>` | 200, `{message, todo}` |

use crate::error::AppError;
use crate::WebResult;
use crate::extractors::{JsonBody, TodoQuery, ID_REQUIRED};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use starter_todos::{validate_changes, validate_new_todo, Todo, ValidationErrors};

/// Confirmation message returned by DELETE
pub const DELETED_MESSAGE: &str = "Todo deleted successfully";

/// Response of `DELETE /todos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always [`DELETED_MESSAGE`]
    pub message: String,
    /// The removed todo
    pub todo: Todo,
}

/// `GET /todos` - all todos, optionally filtered by completion.
///
/// `?completed=true` selects completed todos; any other value selects the
/// incomplete ones.
///
/// # Errors
///
/// 500 when the repository fails.
#[tracing::instrument(skip_all, name = "todos.list")]
pub async fn list_todos(
    State(state): State<AppState>,
    query: TodoQuery,
) -> WebResult<Json<Vec<Todo>>> {
    let completed = query.completed();
    let todos = state.todos.list(completed).await?;
    tracing::debug!(?completed, count = todos.len(), "Listed todos");
    Ok(Json(todos))
}

/// `POST /todos` - create a todo.
///
/// # Errors
///
/// 400 `INVALID_JSON` for unparseable bodies, 400 `VALIDATION_ERROR` with
/// per-field details for invalid ones.
#[tracing::instrument(skip_all, name = "todos.create")]
pub async fn create_todo(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> WebResult<(StatusCode, Json<Todo>)> {
    let draft = validate_new_todo(&body)?;
    let todo = state.todos.create(draft).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `PUT /todos` - update the text and/or completion of a todo.
///
/// Fields left out of the body keep their stored value.
///
/// # Errors
///
/// 400 when `id` is missing, when it is not a string, or when the provided
/// fields are invalid; 404 when no todo has that id.
#[tracing::instrument(skip_all, name = "todos.update")]
pub async fn update_todo(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> WebResult<Json<Todo>> {
    let id = todo_id(&body)?;
    let changes = validate_changes(&body)?;
    let todo = state.todos.update(id, changes).await?;
    Ok(Json(todo))
}

/// The `id` of an update body. Absent, `null` and `""` count as missing.
fn todo_id(body: &Value) -> WebResult<&str> {
    match body.get("id") {
        None | Some(Value::Null) => Err(AppError::bad_request(ID_REQUIRED)),
        Some(Value::String(id)) if id.is_empty() => Err(AppError::bad_request(ID_REQUIRED)),
        Some(Value::String(id)) => Ok(id),
        Some(_) => {
            let mut errors = ValidationErrors::new();
            errors.add("id", "Expected string");
            Err(AppError::validation(&errors))
        },
    }
}

/// `DELETE /todos?id=<id>` - remove a todo.
///
/// # Errors
///
/// 400 when `id` is missing, 404 when no todo has that id.
#[tracing::instrument(skip_all, name = "todos.delete")]
pub async fn delete_todo(
    State(state): State<AppState>,
    query: TodoQuery,
) -> WebResult<Json<DeleteResponse>> {
    let id = query.require_id()?;
    let todo = state.todos.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: DELETED_MESSAGE.to_string(),
        todo,
    }))
}
