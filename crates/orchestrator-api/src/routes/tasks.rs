use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::dto::{TaskEnqueueRequest, TaskResponse};
use crate::error::ApiError;
use crate::ingest::plan_and_spawn;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/tasks/enqueue",
    request_body = TaskEnqueueRequest,
    responses((status = 202, body = TaskResponse), (status = 502, body = crate::error::ApiErrorResponse))
)]
#[tracing::instrument(skip_all)]
pub async fn enqueue_task(
    State(state): State<AppState>,
    Json(request): Json<TaskEnqueueRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = plan_and_spawn(&state, request.message).await?;
    Ok((StatusCode::ACCEPTED, Json(task.into())))
}

#[utoipa::path(
    get,
    path = "/v1/tasks/{task_id}",
    responses((status = 200, body = TaskResponse), (status = 404, body = crate::error::ApiErrorResponse))
)]
#[tracing::instrument(skip_all)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .store
        .get_task(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))?;
    Ok(Json(task.into()))
}

#[utoipa::path(get, path = "/v1/tasks", responses((status = 200, body = [TaskResponse])))]
#[tracing::instrument(skip_all)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.store.list_tasks().await?;
    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}
