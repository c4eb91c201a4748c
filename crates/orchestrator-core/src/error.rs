use thiserror::Error;

/// Unified error vocabulary shared by the gateways, planner, executor and store.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("the LLM returned an invalid plan: {0}")]
    InvalidPlan(String),

    #[error("the plan contains no steps")]
    EmptyPlan,

    #[error("unknown browser action: {0}")]
    UnknownAction(String),

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("upstream error calling {target}: {message}")]
    Upstream { target: String, message: String },

    #[error("approval not received within the timeout")]
    ApprovalTimeout,

    #[error("approval already resolved")]
    AlreadyResolved,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}
