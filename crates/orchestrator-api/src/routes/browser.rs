use axum::extract::State;
use axum::Json;

use crate::dto::{BrowserProxyRequest, BrowserProxyResponse};
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/internal/browser/proxy",
    request_body = BrowserProxyRequest,
    responses(
        (status = 200, body = BrowserProxyResponse),
        (status = 400, body = crate::error::ApiErrorResponse),
        (status = 502, body = crate::error::ApiErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn proxy(
    State(state): State<AppState>,
    Json(request): Json<BrowserProxyRequest>,
) -> Result<Json<BrowserProxyResponse>, ApiError> {
    let result = state.browser.dispatch(&request.action, &request.args).await?;
    Ok(Json(BrowserProxyResponse { action: request.action, result }))
}
