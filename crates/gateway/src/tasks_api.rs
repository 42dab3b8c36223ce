//! Task REST API.
//!
//! - `GET    /api/tasks`         list, optional `status` / `priority` query
//! - `POST   /api/tasks`         create
//! - `PUT    /api/tasks/{id}`    partial update
//! - `DELETE /api/tasks/{id}`    delete
//! - `GET    /api/tasks/filter`  same as list, kept as its own route

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use serde::Serialize;
use taskpilot_core::error::StoreError;
use taskpilot_core::task::{DeleteTarget, NewTask, Task, TaskFilter, TaskStore, TaskUpdate};
use tracing::{error, info};

use crate::SharedState;

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<DetailResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(DetailResponse {
            detail: detail.into(),
        }),
    )
}

fn store_failure(e: StoreError) -> ApiError {
    error!(error = %e, "Task store request failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Task not found")
}

pub fn tasks_router() -> Router<SharedState> {
    Router::new()
        .route("/api/tasks", get(list_tasks_handler).post(create_task_handler))
        .route("/api/tasks/filter", get(list_tasks_handler))
        .route(
            "/api/tasks/{id}",
            put(update_task_handler).delete(delete_task_handler),
        )
}

async fn list_tasks_handler(
    State(state): State<SharedState>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.store.list(filter).await.map_err(store_failure)?;
    Ok(Json(tasks))
}

async fn create_task_handler(
    State(state): State<SharedState>,
    Json(mut new_task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    new_task.title = new_task.title.trim().to_string();
    if new_task.title.is_empty() {
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, "Title must not be empty"));
    }

    let task = state.store.create(new_task).await.map_err(store_failure)?;
    info!(task_id = task.id, "Task created via API");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    let task = if update.is_empty() {
        state.store.get(id).await
    } else {
        state.store.update(id, update).await
    }
    .map_err(store_failure)?
    .ok_or_else(not_found)?;

    Ok(Json(task))
}

async fn delete_task_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, ApiError> {
    let deleted = state
        .store
        .delete(DeleteTarget::Id(id))
        .await
        .map_err(store_failure)?;

    if !deleted {
        return Err(not_found());
    }

    info!(task_id = id, "Task deleted via API");
    Ok(Json(DetailResponse {
        detail: "Task deleted successfully".into(),
    }))
}
