use axum::extract::{Path, State};
use axum::Json;
use orchestrator_core::CoreError;
use uuid::Uuid;

use crate::dto::ApprovalResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/approvals/{approval_id}/ok",
    responses(
        (status = 200, body = ApprovalResponse),
        (status = 404, body = crate::error::ApiErrorResponse),
        (status = 409, body = crate::error::ApiErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn approve(
    State(state): State<AppState>,
    Path(approval_id): Path<Uuid>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let approval = state
        .store
        .get_approval(approval_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("approval {approval_id} not found")))?;

    if approval.approved {
        return Err(ApiError::from(CoreError::AlreadyResolved));
    }

    let resolved = state.store.resolve_approval(approval_id).await?;
    if !resolved {
        return Err(ApiError::from(CoreError::AlreadyResolved));
    }

    Ok(Json(ApprovalResponse {
        approval_id: approval.id,
        task_id: approval.task_id,
        ok_prompt: approval.ok_prompt,
        approved: true,
    }))
}
