use axum::extract::State;
use axum::Json;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::ApiError;
use crate::ingest::plan_and_spawn;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/chat",
    request_body = ChatRequest,
    responses((status = 200, body = ChatResponse), (status = 502, body = crate::error::ApiErrorResponse))
)]
#[tracing::instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let task = plan_and_spawn(&state, request.message).await?;
    Ok(Json(ChatResponse {
        task_id: task.id,
        status: task.status,
        message: "Plan generated. Execution started.".to_string(),
    }))
}
