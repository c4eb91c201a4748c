pub mod browser;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod planner;
pub mod store;
pub mod types;

pub use crate::config::Settings;
pub use crate::error::{CoreError, CoreResult};
pub use crate::executor::Executor;
pub use crate::planner::Planner;
pub use crate::store::{SqliteTaskStore, TaskStore};
pub use crate::types::{Approval, Plan, PlanStep, StepResult, StepStatus, Task, TaskStatus};
