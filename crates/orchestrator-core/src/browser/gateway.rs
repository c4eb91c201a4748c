use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

const KNOWN_ACTIONS: &[&str] = &[
    "open", "navigate", "click", "type", "extract", "screenshot", "close", "snapshot",
];

/// Dispatches named browser actions to the Browser Agent. A trait so the Executor
/// can be exercised against a fake agent in tests.
#[async_trait]
pub trait BrowserGateway: Send + Sync {
    async fn dispatch(&self, action: &str, args: &Value) -> CoreResult<Value>;
}

pub struct HttpBrowserGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBrowserGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build browser HTTP client");
        HttpBrowserGateway { client, base_url: base_url.into() }
    }

    async fn post(&self, path: &str, body: Value) -> CoreResult<Value> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        self.send(self.client.post(&url).json(&body)).await
    }

    async fn get(&self, path: &str) -> CoreResult<Value> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        self.send(self.client.get(&url)).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> CoreResult<Value> {
        let response = builder.send().await.map_err(|e| CoreError::Upstream {
            target: "browser".into(),
            message: e.to_string(),
        })?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Upstream {
                target: "browser".into(),
                message: format!("status {status}: {}", &body[..body.len().min(200)]),
            });
        }
        response.json().await.map_err(|e| CoreError::Upstream {
            target: "browser".into(),
            message: e.to_string(),
        })
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> CoreResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::InvalidPlan(format!("missing or non-string arg `{key}`")))
}

#[async_trait]
impl BrowserGateway for HttpBrowserGateway {
    async fn dispatch(&self, action: &str, args: &Value) -> CoreResult<Value> {
        if !KNOWN_ACTIONS.contains(&action) {
            return Err(CoreError::UnknownAction(action.to_string()));
        }
        match action {
            "open" => {
                let url = required_str(args, "url")?;
                self.post("/v1/browser/open", serde_json::json!({"url": url})).await
            }
            "navigate" => {
                let url = required_str(args, "url")?;
                self.post("/v1/browser/navigate", serde_json::json!({"url": url})).await
            }
            "click" => {
                let element_id = required_str(args, "element_id")?;
                self.post("/v1/browser/click", serde_json::json!({"element_id": element_id})).await
            }
            "type" => {
                let element_id = required_str(args, "element_id")?;
                let text = required_str(args, "text")?;
                self.post(
                    "/v1/browser/type",
                    serde_json::json!({"element_id": element_id, "text": text}),
                )
                .await
            }
            "extract" => {
                let selector = required_str(args, "selector")?;
                self.post("/v1/browser/extract", serde_json::json!({"selector": selector})).await
            }
            "screenshot" => self.get("/v1/browser/screenshot").await,
            "snapshot" => self.get("/v1/browser/snapshot").await,
            "close" => self.post("/v1/browser/close", serde_json::json!({})).await,
            _ => unreachable!("checked against KNOWN_ACTIONS above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_action_rejected_before_any_request() {
        let gateway = HttpBrowserGateway::new("http://127.0.0.1:1", Duration::from_secs(1));
        let err = gateway.dispatch("teleport", &Value::Null).await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownAction(a) if a == "teleport"));
    }

    #[tokio::test]
    async fn missing_required_arg_rejected() {
        let gateway = HttpBrowserGateway::new("http://127.0.0.1:1", Duration::from_secs(1));
        let err = gateway.dispatch("open", &serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidPlan(_)));
    }
}
