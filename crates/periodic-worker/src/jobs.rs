use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use crate::config::WorkerSettings;

/// Outcome of running a job handler once. Stored verbatim (as its debug
/// string) against the job id so a caller can look up what happened.
#[derive(Debug)]
pub enum JobOutcome {
    Ok(serde_json::Value),
    Failed(String),
}

pub async fn run(kind: &str, payload: &serde_json::Value, settings: &WorkerSettings) -> JobOutcome {
    let result = match kind {
        "health_check" => health_check(settings).await,
        "daily_briefing" => daily_briefing(settings).await,
        "browser_task" => browser_task(payload, settings).await,
        "summarize_memory" => summarize_memory(payload, settings).await,
        other => Err(anyhow::anyhow!("unknown job kind: {other}")),
    };
    match result {
        Ok(value) => JobOutcome::Ok(value),
        Err(err) => JobOutcome::Failed(err.to_string()),
    }
}

/// Pings api-core, browser-agent and llm-runtime and classifies each as
/// `ok` / `degraded:{status}` / `down` / `error:{msg}`.
async fn health_check(settings: &WorkerSettings) -> anyhow::Result<serde_json::Value> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
    let endpoints = [
        ("api-core", format!("{}/health", settings.api_core_url)),
        ("browser-agent", format!("{}/health", settings.browser_agent_url)),
        ("llm-runtime", format!("{}/api/tags", settings.llm_runtime_url)),
    ];

    let mut results = serde_json::Map::new();
    for (name, url) in endpoints {
        let status = match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                info!(service = name, status = %resp.status(), "health_check: ok");
                "ok".to_string()
            }
            Ok(resp) => {
                warn!(service = name, status = %resp.status(), "health_check: degraded");
                format!("degraded:{}", resp.status().as_u16())
            }
            Err(err) if err.is_connect() => {
                warn!(service = name, "health_check: down");
                "down".to_string()
            }
            Err(err) => {
                warn!(service = name, error = %err, "health_check: error");
                format!("error:{err}")
            }
        };
        results.insert(name.to_string(), json!(status));
    }
    Ok(serde_json::Value::Object(results))
}

/// Triggers the morning briefing by posting a synthesized greeting to
/// api-core's chat endpoint; api-core drives the LLM and plan execution.
async fn daily_briefing(settings: &WorkerSettings) -> anyhow::Result<serde_json::Value> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
    let payload = json!({
        "message": "Good morning. Give me a briefing: pending tasks, reminders, and a system status summary.",
        "session_id": null,
    });
    let resp = client.post(format!("{}/v1/chat", settings.api_core_url)).json(&payload).send().await?;
    let status = resp.status();
    info!(%status, "daily_briefing: sent");
    Ok(json!({"status": status.as_u16(), "ok": status.is_success()}))
}

/// Enqueues a browser task by describing the intent in natural language,
/// matching the orchestrator's single chat-shaped task-intake contract.
async fn browser_task(payload: &serde_json::Value, settings: &WorkerSettings) -> anyhow::Result<serde_json::Value> {
    let url = payload.get("url").and_then(|v| v.as_str()).ok_or_else(|| anyhow::anyhow!("browser_task payload missing url"))?;
    let action = payload.get("action").and_then(|v| v.as_str()).unwrap_or("screenshot");

    let client = reqwest::Client::builder().timeout(Duration::from_secs(60)).build()?;
    let request = json!({"message": format!("{action} {url}")});
    let resp = client.post(format!("{}/v1/tasks/enqueue", settings.api_core_url)).json(&request).send().await?;
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or(json!(null));
    info!(%status, "browser_task: enqueued");
    Ok(json!({"status": status.as_u16(), "body": body}))
}

/// Requests memory summarization for a session (or, with none given, lets
/// api-core decide what to compact) by describing the intent in chat form.
async fn summarize_memory(payload: &serde_json::Value, settings: &WorkerSettings) -> anyhow::Result<serde_json::Value> {
    let session_id = payload.get("session_id").and_then(|v| v.as_str());
    let message = match session_id {
        Some(id) => format!("Summarize and compact the memory for session {id}."),
        None => "Summarize and compact memory for whatever session needs it most.".to_string(),
    };

    let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
    let request = json!({"message": message, "session_id": session_id});
    let resp = client.post(format!("{}/v1/tasks/enqueue", settings.api_core_url)).json(&request).send().await?;
    let status = resp.status();
    info!(%status, "summarize_memory: requested");
    Ok(json!({"status": status.as_u16(), "ok": status.is_success()}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_kind_fails() {
        let settings = WorkerSettings {
            redis_url: "redis://localhost".into(),
            api_core_url: "http://localhost".into(),
            browser_agent_url: "http://localhost".into(),
            llm_runtime_url: "http://localhost".into(),
            health_check_every_n_minutes: 5,
            daily_briefing_hour: 8,
            daily_briefing_minute: 0,
            concurrency: 10,
            job_timeout: Duration::from_secs(300),
            max_tries: 3,
            job_result_ttl: Duration::from_secs(3600),
        };
        let outcome = run("not_a_real_job", &json!({}), &settings).await;
        assert!(matches!(outcome, JobOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn browser_task_requires_url() {
        let settings = WorkerSettings {
            redis_url: "redis://localhost".into(),
            api_core_url: "http://localhost:1".into(),
            browser_agent_url: "http://localhost:1".into(),
            llm_runtime_url: "http://localhost:1".into(),
            health_check_every_n_minutes: 5,
            daily_briefing_hour: 8,
            daily_briefing_minute: 0,
            concurrency: 10,
            job_timeout: Duration::from_secs(300),
            max_tries: 3,
            job_result_ttl: Duration::from_secs(3600),
        };
        let outcome = run("browser_task", &json!({"action": "screenshot"}), &settings).await;
        assert!(matches!(outcome, JobOutcome::Failed(_)));
    }
}
