use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::browser::BrowserGateway;
use crate::error::{CoreError, CoreResult};
use crate::llm::{generate_reply, LlmGateway};
use crate::store::TaskStore;
use crate::types::{Approval, PlanStep, StepResult, StepStatus, Task, TaskStatus};

/// Drives a single Task's plan to completion. At most one Executor ever runs a
/// given task; it is the sole mutator of that task's state once started.
pub struct Executor {
    store: Arc<dyn TaskStore>,
    llm: Arc<dyn LlmGateway>,
    browser: Arc<dyn BrowserGateway>,
    approval_timeout: Duration,
}

impl Executor {
    pub fn new(
        store: Arc<dyn TaskStore>,
        llm: Arc<dyn LlmGateway>,
        browser: Arc<dyn BrowserGateway>,
        approval_timeout: Duration,
    ) -> Self {
        Executor { store, llm, browser, approval_timeout }
    }

    /// Pre: `task.plan` is set and `task.status == Pending`.
    pub async fn run(&self, mut task: Task) -> CoreResult<()> {
        task.status = TaskStatus::Running;
        self.store.save_task(&task).await?;

        let plan = task
            .plan
            .clone()
            .expect("executor.run requires task.plan to already be set");

        for (idx, step) in plan.steps.iter().enumerate() {
            task.current_step = idx;
            self.store.save_task(&task).await?;

            if step.needs_ok {
                match self.request_approval(&mut task, idx, step).await {
                    Ok(()) => {}
                    Err(CoreError::ApprovalTimeout) => {
                        self.record_step(
                            &mut task,
                            idx,
                            step,
                            StepStatus::Skipped,
                            Value::Null,
                            Some(CoreError::ApprovalTimeout.to_string()),
                        )
                        .await?;
                        task.status = TaskStatus::Failed;
                        task.error = Some(format!("step {idx} required approval but none was received."));
                        self.store.save_task(&task).await?;
                        return Ok(());
                    }
                    Err(err) => return Err(err),
                }
            }

            match self.dispatch(step).await {
                Ok(output) => {
                    self.record_step(&mut task, idx, step, StepStatus::Ok, output, None).await?;
                }
                Err(err) => {
                    self.record_step(
                        &mut task,
                        idx,
                        step,
                        StepStatus::Error,
                        Value::Null,
                        Some(err.to_string()),
                    )
                    .await?;
                    task.status = TaskStatus::Failed;
                    task.error = Some(format!("step {idx} ({}): {err}", step.tool));
                    self.store.save_task(&task).await?;
                    return Ok(());
                }
            }
        }

        task.status = TaskStatus::Completed;
        task.reply = match generate_reply(self.llm.as_ref(), &task.goal, &task.results).await {
            Ok(reply) => Some(reply),
            Err(_) => Some(format!("Done: {}", task.goal)),
        };
        self.store.save_task(&task).await?;
        Ok(())
    }

    async fn dispatch(&self, step: &PlanStep) -> CoreResult<Value> {
        match step.tool.split_once('.') {
            Some(("browser", action)) => self.browser.dispatch(action, &step.args).await,
            Some((service, _)) => Err(CoreError::UnknownService(service.to_string())),
            None => Err(CoreError::UnknownService(step.tool.clone())),
        }
    }

    async fn request_approval(&self, task: &mut Task, idx: usize, step: &PlanStep) -> CoreResult<()> {
        let ok_prompt = step
            .ok_prompt
            .clone()
            .or_else(|| Some(format!("Approve step {idx}: {}?", step.tool)));
        let approval = Approval::new(task.id, idx, ok_prompt);
        self.store.save_approval(&approval).await?;

        task.status = TaskStatus::PausedForApproval;
        task.pending_approval_id = Some(approval.id);
        self.store.save_task(task).await?;

        let signal = self
            .store
            .get_signal(approval.id)
            .expect("save_approval must register a signal for the new approval");

        match tokio::time::timeout(self.approval_timeout, signal.notified()).await {
            Ok(()) => {
                task.status = TaskStatus::Running;
                task.pending_approval_id = None;
                self.store.save_task(task).await?;
                Ok(())
            }
            Err(_) => Err(CoreError::ApprovalTimeout),
        }
    }

    async fn record_step(
        &self,
        task: &mut Task,
        idx: usize,
        step: &PlanStep,
        status: StepStatus,
        output: Value,
        error: Option<String>,
    ) -> CoreResult<()> {
        task.results.push(StepResult {
            step_index: idx,
            tool: step.tool.clone(),
            args: step.args.clone(),
            status,
            output,
            error,
        });
        self.store.save_task(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserGateway;
    use crate::llm::ChatMessage;
    use crate::store::SignalRegistry;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeStore {
        tasks: StdMutex<HashMap<Uuid, Task>>,
        approvals: StdMutex<HashMap<Uuid, Approval>>,
        signals: SignalRegistry,
    }

    #[async_trait]
    impl TaskStore for FakeStore {
        async fn save_task(&self, task: &Task) -> CoreResult<()> {
            self.tasks.lock().unwrap().insert(task.id, task.clone());
            Ok(())
        }
        async fn get_task(&self, id: Uuid) -> CoreResult<Option<Task>> {
            Ok(self.tasks.lock().unwrap().get(&id).cloned())
        }
        async fn list_tasks(&self) -> CoreResult<Vec<Task>> {
            Ok(self.tasks.lock().unwrap().values().cloned().collect())
        }
        async fn save_approval(&self, approval: &Approval) -> CoreResult<()> {
            self.approvals.lock().unwrap().insert(approval.id, approval.clone());
            self.signals.get_or_create(approval.id);
            Ok(())
        }
        async fn get_approval(&self, id: Uuid) -> CoreResult<Option<Approval>> {
            Ok(self.approvals.lock().unwrap().get(&id).cloned())
        }
        fn get_signal(&self, approval_id: Uuid) -> Option<Arc<Notify>> {
            self.signals.get(approval_id)
        }
        async fn resolve_approval(&self, id: Uuid) -> CoreResult<bool> {
            let mut approvals = self.approvals.lock().unwrap();
            if let Some(approval) = approvals.get_mut(&id) {
                if !approval.approved {
                    approval.approved = true;
                    drop(approvals);
                    self.signals.fire(id);
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }

    struct FakeLlm;

    #[async_trait]
    impl LlmGateway for FakeLlm {
        async fn chat_completion(
            &self,
            _messages: Vec<ChatMessage>,
            _temperature: f32,
            _max_tokens: u32,
            _json_mode: bool,
        ) -> CoreResult<String> {
            Ok("all done".into())
        }
    }

    struct FakeBrowser {
        fail_on: Option<usize>,
        calls: StdMutex<usize>,
    }

    #[async_trait]
    impl BrowserGateway for FakeBrowser {
        async fn dispatch(&self, action: &str, _args: &Value) -> CoreResult<Value> {
            let mut calls = self.calls.lock().unwrap();
            let this_call = *calls;
            *calls += 1;
            if self.fail_on == Some(this_call) {
                return Err(CoreError::Upstream { target: "browser".into(), message: "boom".into() });
            }
            Ok(Value::String(format!("did {action}")))
        }
    }

    fn plan_with_steps(steps: Vec<PlanStep>) -> crate::types::Plan {
        crate::types::Plan { goal: "test goal".into(), steps }
    }

    fn step(tool: &str, needs_ok: bool) -> PlanStep {
        PlanStep { tool: tool.into(), args: Value::Null, needs_ok, ok_prompt: None }
    }

    #[tokio::test]
    async fn happy_path_completes_with_reply() {
        let store: Arc<dyn TaskStore> = Arc::new(FakeStore::default());
        let llm: Arc<dyn LlmGateway> = Arc::new(FakeLlm);
        let browser: Arc<dyn BrowserGateway> =
            Arc::new(FakeBrowser { fail_on: None, calls: StdMutex::new(0) });
        let executor = Executor::new(store.clone(), llm, browser, Duration::from_secs(5));

        let mut task = Task::new("open google");
        task.plan = Some(plan_with_steps(vec![step("browser.open", false)]));
        let id = task.id;

        executor.run(task).await.unwrap();

        let loaded = store.get_task(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::Completed);
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].status, StepStatus::Ok);
        assert_eq!(loaded.reply.as_deref(), Some("all done"));
    }

    #[tokio::test]
    async fn step_error_fails_the_task() {
        let store: Arc<dyn TaskStore> = Arc::new(FakeStore::default());
        let llm: Arc<dyn LlmGateway> = Arc::new(FakeLlm);
        let browser: Arc<dyn BrowserGateway> =
            Arc::new(FakeBrowser { fail_on: Some(1), calls: StdMutex::new(0) });
        let executor = Executor::new(store.clone(), llm, browser, Duration::from_secs(5));

        let mut task = Task::new("two steps");
        task.plan = Some(plan_with_steps(vec![
            step("browser.open", false),
            step("browser.click", false),
        ]));
        let id = task.id;

        executor.run(task).await.unwrap();

        let loaded = store.get_task(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::Failed);
        assert_eq!(loaded.results.len(), 2);
        assert_eq!(loaded.results[0].status, StepStatus::Ok);
        assert_eq!(loaded.results[1].status, StepStatus::Error);
    }

    #[tokio::test]
    async fn unknown_service_fails_the_task() {
        let store: Arc<dyn TaskStore> = Arc::new(FakeStore::default());
        let llm: Arc<dyn LlmGateway> = Arc::new(FakeLlm);
        let browser: Arc<dyn BrowserGateway> =
            Arc::new(FakeBrowser { fail_on: None, calls: StdMutex::new(0) });
        let executor = Executor::new(store.clone(), llm, browser, Duration::from_secs(5));

        let mut task = Task::new("unsupported");
        task.plan = Some(plan_with_steps(vec![step("email.send", false)]));
        let id = task.id;

        executor.run(task).await.unwrap();

        let loaded = store.get_task(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn approval_granted_resumes_execution() {
        let store: Arc<dyn TaskStore> = Arc::new(FakeStore::default());
        let llm: Arc<dyn LlmGateway> = Arc::new(FakeLlm);
        let browser: Arc<dyn BrowserGateway> =
            Arc::new(FakeBrowser { fail_on: None, calls: StdMutex::new(0) });
        let executor = Executor::new(store.clone(), llm, browser, Duration::from_secs(5));

        let mut task = Task::new("buy it");
        task.plan = Some(plan_with_steps(vec![step("browser.click", true)]));
        let id = task.id;

        let store_for_approver = store.clone();
        let approver = tokio::spawn(async move {
            loop {
                if let Some(t) = store_for_approver.get_task(id).await.unwrap() {
                    if let Some(approval_id) = t.pending_approval_id {
                        store_for_approver.resolve_approval(approval_id).await.unwrap();
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        executor.run(task).await.unwrap();
        approver.await.unwrap();

        let loaded = store.get_task(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::Completed);
        assert!(loaded.pending_approval_id.is_none());
    }

    #[tokio::test]
    async fn approval_timeout_fails_the_task_with_skipped_result() {
        let store: Arc<dyn TaskStore> = Arc::new(FakeStore::default());
        let llm: Arc<dyn LlmGateway> = Arc::new(FakeLlm);
        let browser: Arc<dyn BrowserGateway> =
            Arc::new(FakeBrowser { fail_on: None, calls: StdMutex::new(0) });
        let executor = Executor::new(store.clone(), llm, browser, Duration::from_millis(20));

        let mut task = Task::new("buy it");
        task.plan = Some(plan_with_steps(vec![step("browser.click", true)]));
        let id = task.id;

        executor.run(task).await.unwrap();

        let loaded = store.get_task(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::Failed);
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].status, StepStatus::Skipped);
        assert!(loaded.error.unwrap().contains("approval"));
    }
}
