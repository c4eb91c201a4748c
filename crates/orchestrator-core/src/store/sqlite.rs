use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tokio::sync::Notify;
use uuid::Uuid;

use super::{SignalRegistry, SqlitePool, TaskStore};
use crate::error::CoreResult;
use crate::types::{Approval, Plan, StepResult, Task, TaskStatus};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    goal TEXT NOT NULL,
    plan_json TEXT NOT NULL,
    status TEXT NOT NULL,
    error TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS approvals (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL,
    step_index INTEGER NOT NULL,
    ok_prompt TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    resolved_at TEXT
);
";

/// Maps the in-memory `TaskStatus` to the persisted status vocabulary
/// (`pending | running | waiting_approval | done | failed | cancelled`).
/// `cancelled` is reserved in the schema's CHECK constraint for future use;
/// this implementation never produces it.
fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Running => "running",
        TaskStatus::PausedForApproval => "waiting_approval",
        TaskStatus::Completed => "done",
        TaskStatus::Failed => "failed",
    }
}

fn status_from_db(value: &str) -> TaskStatus {
    match value {
        "running" => TaskStatus::Running,
        "waiting_approval" => TaskStatus::PausedForApproval,
        "done" => TaskStatus::Completed,
        "failed" | "cancelled" => TaskStatus::Failed,
        _ => TaskStatus::Pending,
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedTaskBody {
    plan: Option<Plan>,
    results: Vec<StepResult>,
    current_step: usize,
    pending_approval_id: Option<Uuid>,
    reply: Option<String>,
}

pub struct SqliteTaskStore {
    pool: SqlitePool,
    signals: SignalRegistry,
}

impl SqliteTaskStore {
    /// Opens (creating if absent) the database, applies migrations, and sweeps any
    /// task left `paused_for_approval` from a prior process into `failed` — the
    /// approval signal that would have woken it cannot survive a restart.
    pub async fn open(database_url: &str, pool_size: usize, acquire_timeout: Duration) -> CoreResult<Self> {
        let pool = SqlitePool::open(database_url, pool_size, acquire_timeout)?;
        pool.with_conn(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        let store = SqliteTaskStore { pool, signals: SignalRegistry::new() };
        store.sweep_orphaned_approvals().await?;
        Ok(store)
    }

    async fn sweep_orphaned_approvals(&self) -> CoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let waiting = status_to_db(TaskStatus::PausedForApproval);
        let failed = status_to_db(TaskStatus::Failed);
        self.pool
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE tasks SET status = ?1, error = ?2, updated_at = ?3 WHERE status = ?4",
                    params![
                        failed,
                        "orphaned at restart: approval signal lost",
                        now,
                        waiting
                    ],
                )?;
                Ok(())
            })
            .await
    }

    fn row_to_task(
        id: Uuid,
        goal: String,
        plan_json: String,
        status: String,
        error: Option<String>,
        created_at: String,
        updated_at: String,
    ) -> CoreResult<Task> {
        let body: PersistedTaskBody = serde_json::from_str(&plan_json)?;
        Ok(Task {
            id,
            goal,
            plan: body.plan,
            status: status_from_db(&status),
            current_step: body.current_step,
            results: body.results,
            pending_approval_id: body.pending_approval_id,
            error,
            reply: body.reply,
            created_at: created_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
            updated_at: updated_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn save_task(&self, task: &Task) -> CoreResult<()> {
        let body = PersistedTaskBody {
            plan: task.plan.clone(),
            results: task.results.clone(),
            current_step: task.current_step,
            pending_approval_id: task.pending_approval_id,
            reply: task.reply.clone(),
        };
        let plan_json = serde_json::to_string(&body)?;
        let db_status = status_to_db(task.status).to_string();
        let id = task.id.to_string();
        let goal = task.goal.clone();
        let error = task.error.clone();
        let created_at = task.created_at.to_rfc3339();
        let now = Utc::now().to_rfc3339();

        self.pool
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO tasks (id, goal, plan_json, status, error, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                        goal = excluded.goal,
                        plan_json = excluded.plan_json,
                        status = excluded.status,
                        error = excluded.error,
                        updated_at = excluded.updated_at",
                    params![id, goal, plan_json, db_status, error, created_at, now],
                )?;
                Ok(())
            })
            .await
    }

    async fn get_task(&self, id: Uuid) -> CoreResult<Option<Task>> {
        let id_str = id.to_string();
        self.pool
            .with_conn(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT goal, plan_json, status, error, created_at, updated_at
                         FROM tasks WHERE id = ?1",
                        params![id_str],
                        |r| {
                            Ok((
                                r.get::<_, String>(0)?,
                                r.get::<_, String>(1)?,
                                r.get::<_, String>(2)?,
                                r.get::<_, Option<String>>(3)?,
                                r.get::<_, String>(4)?,
                                r.get::<_, String>(5)?,
                            ))
                        },
                    )
                    .optional()?;
                match row {
                    Some((goal, plan_json, status, error, created_at, updated_at)) => Ok(Some(
                        SqliteTaskStore::row_to_task(id, goal, plan_json, status, error, created_at, updated_at)?,
                    )),
                    None => Ok(None),
                }
            })
            .await
    }

    async fn list_tasks(&self) -> CoreResult<Vec<Task>> {
        self.pool
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, goal, plan_json, status, error, created_at, updated_at
                     FROM tasks ORDER BY created_at DESC",
                )?;
                let rows = stmt.query_map([], |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, Option<String>>(4)?,
                        r.get::<_, String>(5)?,
                        r.get::<_, String>(6)?,
                    ))
                })?;
                let mut tasks = Vec::new();
                for row in rows {
                    let (id, goal, plan_json, status, error, created_at, updated_at) = row?;
                    let id = Uuid::parse_str(&id).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    tasks.push(SqliteTaskStore::row_to_task(
                        id, goal, plan_json, status, error, created_at, updated_at,
                    )?);
                }
                Ok(tasks)
            })
            .await
    }

    async fn save_approval(&self, approval: &Approval) -> CoreResult<()> {
        let id = approval.id.to_string();
        let task_id = approval.task_id.to_string();
        let step_index = approval.step_index as i64;
        let ok_prompt = approval.ok_prompt.clone();
        let created_at = approval.created_at.to_rfc3339();

        self.pool
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO approvals (id, task_id, step_index, ok_prompt, status, created_at)
                     VALUES (?1, ?2, ?3, ?4, 'pending', ?5)
                     ON CONFLICT(id) DO NOTHING",
                    params![id, task_id, step_index, ok_prompt, created_at],
                )?;
                Ok(())
            })
            .await?;

        self.signals.get_or_create(approval.id);
        Ok(())
    }

    async fn get_approval(&self, id: Uuid) -> CoreResult<Option<Approval>> {
        let id_str = id.to_string();
        self.pool
            .with_conn(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT task_id, step_index, ok_prompt, status, created_at, resolved_at
                         FROM approvals WHERE id = ?1",
                        params![id_str],
                        |r| {
                            Ok((
                                r.get::<_, String>(0)?,
                                r.get::<_, i64>(1)?,
                                r.get::<_, Option<String>>(2)?,
                                r.get::<_, String>(3)?,
                                r.get::<_, String>(4)?,
                                r.get::<_, Option<String>>(5)?,
                            ))
                        },
                    )
                    .optional()?;
                Ok(row.map(|(task_id, step_index, ok_prompt, status, created_at, resolved_at)| Approval {
                    id,
                    task_id: Uuid::parse_str(&task_id).unwrap_or_default(),
                    step_index: step_index as usize,
                    ok_prompt,
                    approved: status == "approved",
                    created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
                    resolved_at: resolved_at.and_then(|s| s.parse().ok()),
                }))
            })
            .await
    }

    fn get_signal(&self, approval_id: Uuid) -> Option<Arc<Notify>> {
        self.signals.get(approval_id)
    }

    async fn resolve_approval(&self, id: Uuid) -> CoreResult<bool> {
        let id_str = id.to_string();
        let now = Utc::now().to_rfc3339();
        let updated = self
            .pool
            .with_conn(move |conn| {
                let changed = conn.execute(
                    "UPDATE approvals SET status = 'approved', resolved_at = ?1
                     WHERE id = ?2 AND status = 'pending'",
                    params![now, id_str],
                )?;
                Ok(changed > 0)
            })
            .await?;

        if updated {
            self.signals.fire(id);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteTaskStore {
        SqliteTaskStore::open(":memory:", 1, Duration::from_secs(1)).await.unwrap()
    }

    #[tokio::test]
    async fn round_trips_a_task() {
        let store = test_store().await;
        let mut task = Task::new("open google");
        task.status = TaskStatus::Running;
        store.save_task(&task).await.unwrap();

        let loaded = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, task.id);
        assert_eq!(loaded.goal, task.goal);
        assert_eq!(loaded.status, TaskStatus::Running);
    }

    #[tokio::test]
    async fn reply_survives_a_round_trip() {
        let store = test_store().await;
        let mut task = Task::new("open google");
        task.status = TaskStatus::Completed;
        task.reply = Some("All done.".to_string());
        store.save_task(&task).await.unwrap();

        let loaded = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(loaded.reply.as_deref(), Some("All done."));
    }

    #[tokio::test]
    async fn unknown_task_is_none() {
        let store = test_store().await;
        assert!(store.get_task(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn resolve_approval_is_idempotent() {
        let store = test_store().await;
        let task = Task::new("goal");
        store.save_task(&task).await.unwrap();
        let approval = Approval::new(task.id, 0, None);
        store.save_approval(&approval).await.unwrap();

        assert!(store.resolve_approval(approval.id).await.unwrap());
        assert!(!store.resolve_approval(approval.id).await.unwrap());

        let loaded = store.get_approval(approval.id).await.unwrap().unwrap();
        assert!(loaded.approved);
    }

    #[tokio::test]
    async fn orphaned_waiting_approval_tasks_are_failed_on_open() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap().to_string();

        {
            let store = SqliteTaskStore::open(&path, 1, Duration::from_secs(1)).await.unwrap();
            let mut task = Task::new("stuck");
            task.status = TaskStatus::PausedForApproval;
            store.save_task(&task).await.unwrap();

            // reopen to simulate a process restart against the same database file
            let reopened = SqliteTaskStore::open(&path, 1, Duration::from_secs(1)).await.unwrap();
            let loaded = reopened.get_task(task.id).await.unwrap().unwrap();
            assert_eq!(loaded.status, TaskStatus::Failed);
        }
    }
}
