use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use tracing::info;

use super::utils::present;
use crate::app::AppState;
use crate::database::NewTask;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /tasks - List all tasks
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let tasks = state.store.select_all().await?;
    let body = tasks
        .iter()
        .map(|task| present(&state.schema, task))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ApiResponse::success(body))
}

/// POST /tasks - Create a task.
///
/// Responds 200 (not 201) with the stored task.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let new_task: NewTask = state.schema.insert.parse(&body)?;

    let task = state.store.insert(new_task).await?;
    info!(task_id = task.id, "Created task");

    Ok(ApiResponse::success(present(&state.schema, &task)?))
}
