use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::chat::chat,
        crate::routes::tasks::enqueue_task,
        crate::routes::tasks::get_task,
        crate::routes::tasks::list_tasks,
        crate::routes::approvals::approve,
        crate::routes::browser::proxy,
    ),
    components(schemas(
        crate::dto::ChatRequest,
        crate::dto::ChatResponse,
        crate::dto::TaskEnqueueRequest,
        crate::dto::TaskResponse,
        crate::dto::ApprovalResponse,
        crate::dto::BrowserProxyRequest,
        crate::dto::BrowserProxyResponse,
        crate::dto::HealthResponse,
        crate::error::ApiErrorResponse,
        crate::error::ApiErrorBody,
    ))
)]
pub struct ApiDoc;
