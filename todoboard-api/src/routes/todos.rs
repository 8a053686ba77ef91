/// To-do list endpoints
///
/// Every handler runs behind the session gate and operates on the requesting
/// owner's items only. Mutations answer with the owner's complete list so the
/// client can re-render without a second round trip.
///
/// # Endpoints
///
/// - `GET /api/todos` - List items, most recently created first
/// - `POST /api/todos` - Create an item (201)
/// - `POST /api/todos/update` - Partially update an item
/// - `POST /api/todos/delete` - Delete an item
///
/// # Due dates
///
/// `dueDate` is always `createdAt` plus 1 day (high), 3 days (medium) or
/// 7 days (low). Clients cannot set it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::AuthContext,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use todoboard_shared::models::todo::{NewTodo, Priority, TodoItem, TodoPatch};
use tracing::{debug, info};
use uuid::Uuid;

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub task: String,

    /// `high`, `medium` or `low`; defaults to `low`
    pub priority: Option<String>,

    pub description: Option<String>,

    pub completed: Option<bool>,
}

/// Partial update request
///
/// Omitted fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub id: Option<String>,
    pub task: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Delete request
#[derive(Debug, Deserialize)]
pub struct DeleteTodoRequest {
    pub id: Option<String>,
}

/// Lists the caller's items
///
/// ```text
/// GET /api/todos
/// ```
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TodoItem>>> {
    let items = state.todos.list(auth.owner()).await?;
    Ok(Json(items))
}

/// Creates an item
///
/// ```text
/// POST /api/todos
/// Content-Type: application/json
///
/// { "task": "Buy milk", "priority": "high" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Blank task, unknown priority, malformed body
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<TodoItem>>)> {
    let Json(req) = payload?;

    let new = NewTodo::parse(&req.task, req.priority.as_deref())?
        .with_description(req.description.unwrap_or_default())
        .with_completed(req.completed.unwrap_or(false));

    let owner = auth.owner();
    let item = state.todos.create(owner, new).await?;

    info!(
        user = auth.display_name(),
        todo_id = %item.id,
        priority = %item.priority,
        due_date = %item.due_date,
        "Todo created"
    );

    let items = state.todos.list(owner).await?;
    Ok((StatusCode::CREATED, Json(items)))
}

/// Updates an item
///
/// Changing `priority` recomputes `dueDate` from the original `createdAt`.
///
/// ```text
/// POST /api/todos/update
/// Content-Type: application/json
///
/// { "id": "...", "priority": "medium", "completed": true }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing id, blank task, unknown priority
/// - `404 Not Found`: The caller has no item with this id
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<TodoItem>>> {
    let Json(req) = payload?;

    let id = required_id(req.id.as_deref())?
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))?;

    let mut patch = TodoPatch::default();
    if let Some(task) = req.task.as_deref() {
        patch = patch.with_task(task)?;
    }
    if let Some(priority) = req.priority.as_deref() {
        patch = patch.with_priority(priority.parse::<Priority>()?);
    }
    if let Some(description) = req.description {
        patch = patch.with_description(description);
    }
    if let Some(completed) = req.completed {
        patch = patch.with_completed(completed);
    }

    let owner = auth.owner();
    let item = state.todos.update(id, owner, patch).await?;

    info!(
        user = auth.display_name(),
        todo_id = %item.id,
        due_date = %item.due_date,
        "Todo updated"
    );

    let items = state.todos.list(owner).await?;
    Ok(Json(items))
}

/// Deletes an item
///
/// Deleting an unknown id succeeds and leaves the list unchanged.
///
/// ```text
/// POST /api/todos/delete
/// Content-Type: application/json
///
/// { "id": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing id
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<DeleteTodoRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<TodoItem>>> {
    let Json(req) = payload?;
    let owner = auth.owner();

    match required_id(req.id.as_deref())? {
        Some(id) => {
            state.todos.delete(id, owner).await?;
            info!(user = auth.display_name(), todo_id = %id, "Todo deleted");
        }
        None => debug!("Delete of malformed id ignored"),
    }

    let items = state.todos.list(owner).await?;
    Ok(Json(items))
}

/// Parses a request id
///
/// A missing or blank id is a bad request. An id that is not a UUID cannot
/// name any item, so it comes back as `None`.
fn required_id(id: Option<&str>) -> ApiResult<Option<Uuid>> {
    let id = id.map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err(ApiError::BadRequest("Missing id".to_string()));
    }

    Ok(Uuid::parse_str(id).ok())
}
