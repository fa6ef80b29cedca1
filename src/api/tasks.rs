//! Task API endpoints.
//!
//! - `POST /tasks/create` - Create a task
//! - `GET /tasks/sort?sort=priority|date` - List tasks sorted
//! - `GET /tasks/filter?filter=completed|priority&value=..` - List matching tasks
//! - `PATCH /tasks/update/:id` - Partially update a task
//! - `DELETE /tasks/delete/:id` - Delete a task
//! - `GET /tasks/get-all-tasks` - List all tasks
//! - `GET /tasks/get-task/:id` - Get one task

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use std::sync::Arc;

use crate::task::{NewTask, Task, TaskError, TaskId, TaskPatch};

use super::routes::AppState;
use super::types::{CreateTaskRequest, FilterQuery, SortQuery, TaskDto, UpdateTaskRequest};

type ApiError = (StatusCode, String);

/// Create task routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_task))
        .route("/sort", get(sort_tasks))
        .route("/filter", get(filter_tasks))
        .route("/update/:id", patch(update_task))
        .route("/delete/:id", delete(delete_task))
        .route("/get-all-tasks", get(get_all_tasks))
        .route("/get-task/:id", get(get_task))
}

/// Map a task error onto an HTTP status with its message as the body.
pub fn error_response(err: TaskError) -> ApiError {
    let status = match &err {
        TaskError::TaskNotFound(_) => StatusCode::NOT_FOUND,
        TaskError::DuplicateTask { .. } => StatusCode::CONFLICT,
        TaskError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        TaskError::InvalidDate(_)
        | TaskError::UnsupportedSort(_)
        | TaskError::UnsupportedFilter(_)
        | TaskError::InvalidFilterValue { .. }
        | TaskError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
    };
    if status.is_server_error() {
        tracing::warn!("Task request failed: {}", err);
    } else {
        tracing::debug!("Task request rejected: {}", err);
    }
    (status, err.to_string())
}

fn to_dtos(tasks: Vec<Task>) -> Vec<TaskDto> {
    tasks.into_iter().map(Into::into).collect()
}

/// POST /tasks/create
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskDto>), ApiError> {
    let new = NewTask::try_from(req).map_err(error_response)?;
    let task = state.tasks.create_task(new).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// GET /tasks/sort
async fn sort_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Vec<TaskDto>>, ApiError> {
    let tasks = state
        .tasks
        .list_sorted(query.sort.as_deref())
        .await
        .map_err(error_response)?;
    Ok(Json(to_dtos(tasks)))
}

/// GET /tasks/filter
async fn filter_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<TaskDto>>, ApiError> {
    let tasks = state
        .tasks
        .list_by_filter(&query.filter, &query.value)
        .await
        .map_err(error_response)?;
    Ok(Json(to_dtos(tasks)))
}

/// PATCH /tasks/update/:id
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<(StatusCode, Json<TaskDto>), ApiError> {
    let changes = TaskPatch::try_from(req).map_err(error_response)?;
    let task = state
        .tasks
        .update_task(TaskId::new(id), changes)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::ACCEPTED, Json(task.into())))
}

/// DELETE /tasks/delete/:id
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<&'static str, ApiError> {
    state
        .tasks
        .delete_task(TaskId::new(id))
        .await
        .map_err(error_response)?;
    Ok("Task deleted successfully")
}

/// GET /tasks/get-all-tasks
async fn get_all_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    state
        .tasks
        .get_all_tasks()
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /tasks/get-task/:id
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    state
        .tasks
        .get_task(TaskId::new(id))
        .await
        .map(Json)
        .map_err(error_response)
}
