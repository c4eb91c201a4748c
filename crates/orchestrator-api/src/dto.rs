use orchestrator_core::{StepResult, Task, TaskStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskEnqueueRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: Uuid,
    pub status: TaskStatus,
    pub goal: String,
    pub current_step: usize,
    pub results: Vec<StepResult>,
    pub pending_approval_id: Option<Uuid>,
    pub error: Option<String>,
    pub reply: Option<String>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        TaskResponse {
            id: task.id,
            status: task.status,
            goal: task.goal,
            current_step: task.current_step,
            results: task.results,
            pending_approval_id: task.pending_approval_id,
            error: task.error,
            reply: task.reply,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalResponse {
    pub approval_id: Uuid,
    pub task_id: Uuid,
    pub ok_prompt: Option<String>,
    pub approved: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BrowserProxyRequest {
    pub action: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BrowserProxyResponse {
    pub action: String,
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}
