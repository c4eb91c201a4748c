use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// One step of a Plan: `tool` is `service.action`, e.g. `browser.navigate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanStep {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub needs_ok: bool,
    #[serde(default)]
    pub ok_prompt: Option<String>,
}

/// An immutable, validated sequence of steps produced by the Planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub goal: String,
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Error,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct StepResult {
    pub step_index: usize,
    pub tool: String,
    pub args: Value,
    pub status: StepStatus,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    PausedForApproval,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub goal: String,
    pub plan: Option<Plan>,
    pub status: TaskStatus,
    pub current_step: usize,
    pub results: Vec<StepResult>,
    pub pending_approval_id: Option<Uuid>,
    pub error: Option<String>,
    pub reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(goal: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            goal: goal.into(),
            plan: None,
            status: TaskStatus::Pending,
            current_step: 0,
            results: Vec::new(),
            pending_approval_id: None,
            error: None,
            reply: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Approval {
    pub id: Uuid,
    pub task_id: Uuid,
    pub step_index: usize,
    pub ok_prompt: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Approval {
    pub fn new(task_id: Uuid, step_index: usize, ok_prompt: Option<String>) -> Self {
        Approval {
            id: Uuid::new_v4(),
            task_id,
            step_index,
            ok_prompt,
            approved: false,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }
}
