use std::env;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Settings for the orchestrator API process, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub browser_agent_url: String,
    pub browser_timeout: Duration,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub db_pool_min_size: usize,
    pub db_pool_max_size: usize,
    pub db_pool_acquire_timeout: Duration,
    pub approval_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Settings {
            llm_base_url: env_or("LLM_BASE_URL", "http://localhost:11434/v1"),
            llm_model: env_or("LLM_MODEL", "gpt-4o-mini"),
            llm_timeout: Duration::from_secs(env_parse_or("LLM_TIMEOUT", 120)),
            browser_agent_url: env_or("BROWSER_AGENT_URL", "http://localhost:9222"),
            browser_timeout: Duration::from_secs(env_parse_or("BROWSER_TIMEOUT", 60)),
            database_url: env_or("DATABASE_URL", "orchestrator.db"),
            api_host: env_or("API_HOST", "0.0.0.0"),
            api_port: env_parse_or("API_PORT", 8000),
            db_pool_min_size: env_parse_or("DATABASE_POOL_MIN_SIZE", 2),
            db_pool_max_size: env_parse_or("DATABASE_POOL_MAX_SIZE", 10),
            db_pool_acquire_timeout: Duration::from_secs(env_parse_or("DB_POOL_ACQUIRE_TIMEOUT", 5)),
            approval_timeout: Duration::from_secs(env_parse_or("APPROVAL_TIMEOUT", 300)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_to_default() {
        env::remove_var("__NOT_SET_ORCH_TEST__");
        assert_eq!(env_or("__NOT_SET_ORCH_TEST__", "fallback"), "fallback");
    }

    #[test]
    fn env_parse_or_falls_back_on_bad_value() {
        env::set_var("__BAD_PORT_ORCH_TEST__", "not-a-number");
        let port: u16 = env_parse_or("__BAD_PORT_ORCH_TEST__", 8000);
        assert_eq!(port, 8000);
        env::remove_var("__BAD_PORT_ORCH_TEST__");
    }
}
