use std::sync::Arc;
use std::time::Duration;

use orchestrator_core::browser::{BrowserGateway, HttpBrowserGateway};
use orchestrator_core::llm::{HttpLlmGateway, LlmGateway};
use orchestrator_core::store::{SqliteTaskStore, TaskStore};
use orchestrator_core::{Executor, Settings};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub llm: Arc<dyn LlmGateway>,
    pub browser: Arc<dyn BrowserGateway>,
    pub approval_timeout: Duration,
}

impl AppState {
    pub async fn from_settings(settings: &Settings) -> orchestrator_core::CoreResult<Self> {
        let store: Arc<dyn TaskStore> = Arc::new(
            SqliteTaskStore::open(
                &settings.database_url,
                settings.db_pool_max_size,
                settings.db_pool_acquire_timeout,
            )
            .await?,
        );
        let llm: Arc<dyn LlmGateway> = Arc::new(HttpLlmGateway::new(
            settings.llm_base_url.clone(),
            settings.llm_model.clone(),
            settings.llm_timeout,
        ));
        let browser: Arc<dyn BrowserGateway> = Arc::new(HttpBrowserGateway::new(
            settings.browser_agent_url.clone(),
            settings.browser_timeout,
        ));
        Ok(AppState { store, llm, browser, approval_timeout: settings.approval_timeout })
    }

    pub fn executor(&self) -> Executor {
        Executor::new(self.store.clone(), self.llm.clone(), self.browser.clone(), self.approval_timeout)
    }
}
