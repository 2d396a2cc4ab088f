use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::Value;
use tracing::info;

use super::utils::{present, task_id};
use crate::app::AppState;
use crate::database::PatchTask;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /tasks/:id - Get a single task by ID
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Value> {
    let id = task_id(path)?;

    match state.store.select_by_id(id.get()).await? {
        Some(task) => Ok(ApiResponse::success(present(&state.schema, &task)?)),
        None => Err(ApiError::not_found()),
    }
}

/// PATCH /tasks/:id - Partially update a task by ID
///
/// The id is validated before the body, and both before the store is touched.
pub async fn patch(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let id = task_id(path)?;
    let Json(body) = payload?;
    let changes: PatchTask = state.schema.patch.parse(&body)?;

    match state.store.update_by_id(id.get(), changes).await? {
        Some(task) => {
            info!(task_id = task.id, "Updated task");
            Ok(ApiResponse::success(present(&state.schema, &task)?))
        }
        None => Err(ApiError::not_found()),
    }
}

/// DELETE /tasks/:id - Delete a task by ID
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<()> {
    let id = task_id(path)?;

    if state.store.delete_by_id(id.get()).await? {
        info!(task_id = id.get(), "Deleted task");
        Ok(ApiResponse::no_content())
    } else {
        Err(ApiError::not_found())
    }
}
