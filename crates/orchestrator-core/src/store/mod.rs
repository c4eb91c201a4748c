mod pool;
mod signal;
mod sqlite;

pub use pool::SqlitePool;
pub use signal::SignalRegistry;
pub use sqlite::SqliteTaskStore;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::types::{Approval, Task};

/// Durable storage for tasks and approvals, plus the process-local approval
/// signal registry. The store is the single source of truth for task status;
/// the persisted status vocabulary (§ mapping table in `sqlite.rs`) is
/// translated to/from the in-memory `TaskStatus` enum at the store boundary only.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn save_task(&self, task: &Task) -> CoreResult<()>;
    async fn get_task(&self, id: Uuid) -> CoreResult<Option<Task>>;
    async fn list_tasks(&self) -> CoreResult<Vec<Task>>;

    async fn save_approval(&self, approval: &Approval) -> CoreResult<()>;
    async fn get_approval(&self, id: Uuid) -> CoreResult<Option<Approval>>;

    /// Returns the process-local signal for a pending approval, or `None` if this
    /// process never registered one (e.g. after a restart).
    fn get_signal(&self, approval_id: Uuid) -> Option<Arc<Notify>>;

    /// Atomically transitions an approval from unresolved to approved. Returns
    /// `true` and fires the signal the first time; `false` (no side effect) on
    /// every subsequent call.
    async fn resolve_approval(&self, id: Uuid) -> CoreResult<bool>;
}
