pub mod approvals;
pub mod browser;
pub mod chat;
pub mod health;
pub mod tasks;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/v1/chat", post(chat::chat))
        .route("/v1/tasks/enqueue", post(tasks::enqueue_task))
        .route("/v1/tasks", get(tasks::list_tasks))
        .route("/v1/tasks/:task_id", get(tasks::get_task))
        .route("/v1/approvals/:approval_id/ok", post(approvals::approve))
        .route("/internal/browser/proxy", post(browser::proxy))
        .with_state(state)
        .layer(cors)
}
