use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orchestrator_core::CoreError;
use serde::Serialize;
use utoipa::ToSchema;

/// Standardised API error response body.
///
/// Every error returned by the HTTP layer serialises as:
/// `{ "ok": false, "error": { "code": "<code>", "message": "<message>" } }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub ok: bool,
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                ok: false,
                error: ApiErrorBody { code: code.into(), message: message.into() },
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "upstream_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPlan(msg) => Self::upstream(format!("the LLM returned an invalid plan: {msg}")),
            CoreError::EmptyPlan => Self::upstream("the plan contains no steps"),
            CoreError::UnknownAction(action) => Self::bad_request(format!("unknown browser action: {action}")),
            CoreError::UnknownService(service) => Self::bad_request(format!("unknown service: {service}")),
            CoreError::Upstream { target, message } => {
                Self::upstream(format!("upstream error calling {target}: {message}"))
            }
            CoreError::ApprovalTimeout => Self::internal("approval not received"),
            CoreError::AlreadyResolved => Self::conflict("approval already resolved"),
            CoreError::NotFound(what) => Self::not_found(what),
            CoreError::Storage(msg) => Self::internal(msg),
        }
    }
}
