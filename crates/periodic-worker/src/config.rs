use std::env;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub redis_url: String,
    pub api_core_url: String,
    pub browser_agent_url: String,
    pub llm_runtime_url: String,

    pub health_check_every_n_minutes: u32,
    pub daily_briefing_hour: u32,
    pub daily_briefing_minute: u32,

    pub concurrency: usize,
    pub job_timeout: Duration,
    pub max_tries: u32,
    pub job_result_ttl: Duration,
}

impl WorkerSettings {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        WorkerSettings {
            redis_url: env_or("REDIS_URL", "redis://localhost:6379"),
            api_core_url: env_or("API_CORE_URL", "http://localhost:8000"),
            browser_agent_url: env_or("BROWSER_AGENT_URL", "http://localhost:8001"),
            llm_runtime_url: env_or("LLM_RUNTIME_URL", "http://localhost:11434"),
            health_check_every_n_minutes: env_parse_or("HEALTH_CHECK_EVERY_N_MINUTES", 5),
            daily_briefing_hour: env_parse_or("DAILY_BRIEFING_HOUR", 8),
            daily_briefing_minute: env_parse_or("DAILY_BRIEFING_MINUTE", 0),
            concurrency: env_parse_or("WORKER_CONCURRENCY", 10),
            job_timeout: Duration::from_secs(env_parse_or("JOB_TIMEOUT", 300)),
            max_tries: env_parse_or("JOB_MAX_TRIES", 3),
            job_result_ttl: Duration::from_secs(env_parse_or("JOB_RESULT_TTL", 3600)),
        }
    }
}

/// The set of minutes-past-the-hour on which `health_check` runs.
/// `n` must divide 60; otherwise the canonical fallback of 5 is used.
pub fn health_check_minutes(n: u32) -> Vec<u32> {
    let n = if n == 0 || 60 % n != 0 { 5 } else { n };
    (0..60).step_by(n as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_of_sixty_is_used_directly() {
        assert_eq!(health_check_minutes(15), vec![0, 15, 30, 45]);
    }

    #[test]
    fn non_divisor_falls_back_to_five() {
        assert_eq!(health_check_minutes(7), vec![0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55]);
    }

    #[test]
    fn zero_falls_back_to_five() {
        assert_eq!(health_check_minutes(0), health_check_minutes(5));
    }

    #[test]
    fn one_minute_covers_every_minute() {
        assert_eq!(health_check_minutes(1).len(), 60);
    }
}
