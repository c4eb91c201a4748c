use std::time::Duration;

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const QUEUE_HEALTH_CHECK: &str = "jobs:health_check";
pub const QUEUE_DAILY_BRIEFING: &str = "jobs:daily_briefing";
pub const QUEUE_BROWSER_TASK: &str = "jobs:browser_task";
pub const QUEUE_SUMMARIZE_MEMORY: &str = "jobs:summarize_memory";

/// The envelope pushed onto a Redis list for each job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    pub attempt: u32,
}

impl JobEnvelope {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        JobEnvelope { id: Uuid::new_v4(), kind: kind.into(), payload, enqueued_at: Utc::now(), attempt: 0 }
    }
}

/// Thin wrapper over a Redis connection providing FIFO job queues (one key per
/// job kind) and a 1-hour-TTL result store, keyed by job id.
pub struct JobQueue {
    conn: ConnectionManager,
    result_ttl: Duration,
}

impl JobQueue {
    pub async fn connect(redis_url: &str, result_ttl: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(JobQueue { conn, result_ttl })
    }

    pub async fn push(&self, queue_key: &str, job: &JobEnvelope) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let body = serde_json::to_string(job)?;
        conn.lpush::<_, _, ()>(queue_key, body).await?;
        Ok(())
    }

    /// Blocking pop across every job-kind queue at once; acts as the shared
    /// "due jobs" entry point the worker pool polls. Returns `None` on timeout.
    pub async fn pop_any(&self, timeout_secs: f64) -> anyhow::Result<Option<JobEnvelope>> {
        let mut conn = self.conn.clone();
        let keys = [QUEUE_HEALTH_CHECK, QUEUE_DAILY_BRIEFING, QUEUE_BROWSER_TASK, QUEUE_SUMMARIZE_MEMORY];
        let result: Option<(String, String)> = conn.brpop(&keys[..], timeout_secs).await?;
        match result {
            Some((_, body)) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    pub fn queue_key_for(kind: &str) -> &'static str {
        match kind {
            "health_check" => QUEUE_HEALTH_CHECK,
            "daily_briefing" => QUEUE_DAILY_BRIEFING,
            "browser_task" => QUEUE_BROWSER_TASK,
            "summarize_memory" => QUEUE_SUMMARIZE_MEMORY,
            _ => QUEUE_BROWSER_TASK,
        }
    }

    pub async fn store_result(&self, job_id: Uuid, result: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(format!("job_result:{job_id}"), result, self.result_ttl.as_secs())
            .await?;
        Ok(())
    }
}
