mod gateway;
mod prompt;

pub use gateway::{ChatMessage, HttpLlmGateway, LlmGateway};

use crate::error::{CoreError, CoreResult};
use crate::types::StepResult;
use serde_json::Value;

/// Requests a structured Plan from the LLM and returns the raw parsed JSON object.
/// Validation against the Plan schema is the Planner's job, not this gateway's.
pub async fn get_plan_json(gateway: &dyn LlmGateway, user_message: &str) -> CoreResult<Value> {
    let messages = vec![
        ChatMessage::system(prompt::PLAN_SYSTEM_PROMPT),
        ChatMessage::user(user_message),
    ];
    let raw = gateway
        .chat_completion(messages, 0.2, 2048, true)
        .await?;
    serde_json::from_str(&raw).map_err(|e| CoreError::InvalidPlan(e.to_string()))
}

/// Summarizes step results into a human-readable reply, read aloud by the voice client.
pub async fn generate_reply(
    gateway: &dyn LlmGateway,
    goal: &str,
    results: &[StepResult],
) -> CoreResult<String> {
    let summary = prompt::summarize_results(results);
    let messages = vec![
        ChatMessage::system(prompt::REPLY_SYSTEM_PROMPT),
        ChatMessage::user(format!("Goal: {goal}\n\nStep outcomes:\n{summary}")),
    ];
    gateway.chat_completion(messages, 0.7, 512, false).await
}
