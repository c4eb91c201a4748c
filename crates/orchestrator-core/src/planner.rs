use crate::error::{CoreError, CoreResult};
use crate::llm::{get_plan_json, LlmGateway};
use crate::types::Plan;

/// Turns a user utterance into a validated Plan. The only component that trusts
/// the LLM's output; everything downstream operates on an already-validated Plan.
pub struct Planner<'a> {
    llm: &'a dyn LlmGateway,
}

impl<'a> Planner<'a> {
    pub fn new(llm: &'a dyn LlmGateway) -> Self {
        Planner { llm }
    }

    pub async fn build_plan(&self, user_message: &str) -> CoreResult<Plan> {
        let raw = get_plan_json(self.llm, user_message).await?;
        let plan: Plan = serde_json::from_value(raw)
            .map_err(|e| CoreError::InvalidPlan(format!("the LLM returned an invalid plan: {e}")))?;

        if plan.steps.is_empty() {
            return Err(CoreError::EmptyPlan);
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use async_trait::async_trait;

    struct FakeLlm(&'static str);

    #[async_trait]
    impl LlmGateway for FakeLlm {
        async fn chat_completion(
            &self,
            _messages: Vec<ChatMessage>,
            _temperature: f32,
            _max_tokens: u32,
            _json_mode: bool,
        ) -> CoreResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn valid_plan_is_accepted() {
        let llm = FakeLlm(r#"{"goal":"open google","steps":[{"tool":"browser.open","args":{"url":"https://google.com"},"needs_ok":false,"ok_prompt":null}]}"#);
        let planner = Planner::new(&llm);
        let plan = planner.build_plan("open google").await.unwrap();
        assert_eq!(plan.goal, "open google");
        assert_eq!(plan.steps.len(), 1);
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_plan() {
        let llm = FakeLlm(r#"{"bogus":true}"#);
        let planner = Planner::new(&llm);
        let err = planner.build_plan("do something").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidPlan(_)));
    }

    #[tokio::test]
    async fn empty_steps_rejected() {
        let llm = FakeLlm(r#"{"goal":"noop","steps":[]}"#);
        let planner = Planner::new(&llm);
        let err = planner.build_plan("do nothing").await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyPlan));
    }
}
