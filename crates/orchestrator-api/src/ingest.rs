use orchestrator_core::{Task, TaskStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Shared by `/v1/chat` and `/v1/tasks/enqueue`: create the task, plan it
/// synchronously, and start the Executor as a background activity. Returns the
/// task as it stands right after planning (not after execution finishes).
pub async fn plan_and_spawn(state: &AppState, message: String) -> Result<Task, ApiError> {
    let mut task = Task::new(message.clone());
    state.store.save_task(&task).await.map_err(ApiError::from)?;

    let planner = orchestrator_core::Planner::new(state.llm.as_ref());
    let plan = match planner.build_plan(&message).await {
        Ok(plan) => plan,
        Err(err) => {
            task.status = TaskStatus::Failed;
            task.error = Some(err.to_string());
            let _ = state.store.save_task(&task).await;
            return Err(ApiError::from(err));
        }
    };

    task.goal = plan.goal.clone();
    task.plan = Some(plan);
    state.store.save_task(&task).await.map_err(ApiError::from)?;

    let executor = state.executor();
    let spawned = task.clone();
    tokio::spawn(async move {
        if let Err(err) = executor.run(spawned).await {
            tracing::error!(error = %err, "executor run failed");
        }
    });

    Ok(task)
}
