use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage { role: "user", content: content.into() }
    }
}

/// The chat-completion surface the Planner and Executor depend on. A trait so tests
/// can swap in a fake backend instead of a real LLM endpoint.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
        json_mode: bool,
    ) -> CoreResult<String>;
}

/// Talks to an OpenAI-compatible `/chat/completions` endpoint over one shared,
/// connection-pooled HTTP client.
pub struct HttpLlmGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpLlmGateway {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build LLM HTTP client");
        HttpLlmGateway { client, base_url: base_url.into(), model: model.into() }
    }
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
        json_mode: bool,
    ) -> CoreResult<String> {
        let mut payload = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });
        if json_mode {
            payload["response_format"] = serde_json::json!({"type": "json_object"});
        }

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CoreError::Upstream { target: "llm".into(), message: e.to_string() })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Upstream {
                target: "llm".into(),
                message: format!("status {status}: {}", &body[..body.len().min(200)]),
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| CoreError::Upstream { target: "llm".into(), message: e.to_string() })?;

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CoreError::Upstream {
                target: "llm".into(),
                message: "missing choices[0].message.content in response".into(),
            })
    }
}
