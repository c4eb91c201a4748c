use chrono::{Timelike, Utc};
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::config::{health_check_minutes, WorkerSettings};
use crate::queue::{JobEnvelope, JobQueue, QUEUE_DAILY_BRIEFING, QUEUE_HEALTH_CHECK};

/// Drives the two cron-scheduled jobs onto the queue. Runs as a 1-second
/// tick loop, re-checking "is a cron job due this minute, and have we
/// already fired it" on every tick.
pub struct Scheduler {
    queue: std::sync::Arc<JobQueue>,
    health_check_minutes: Vec<u32>,
    daily_briefing_hour: u32,
    daily_briefing_minute: u32,
    last_health_check_minute: Option<u32>,
    last_daily_briefing_minute: Option<(u32, u32)>,
}

impl Scheduler {
    pub fn new(queue: std::sync::Arc<JobQueue>, settings: &WorkerSettings) -> Self {
        Scheduler {
            queue,
            health_check_minutes: health_check_minutes(settings.health_check_every_n_minutes),
            daily_briefing_hour: settings.daily_briefing_hour,
            daily_briefing_minute: settings.daily_briefing_minute,
            last_health_check_minute: None,
            last_daily_briefing_minute: None,
        }
    }

    /// Runs forever, ticking once a second. `health_check` also fires once
    /// immediately, mirroring the startup connectivity check.
    pub async fn run(mut self) {
        info!("scheduler: starting tick loop");
        self.enqueue_health_check().await;

        let mut tick = interval(Duration::from_secs(1));
        loop {
            tick.tick().await;
            self.check_due(Utc::now().time().hour(), Utc::now().time().minute()).await;
        }
    }

    async fn check_due(&mut self, hour: u32, minute: u32) {
        if self.health_check_minutes.contains(&minute) && self.last_health_check_minute != Some(minute) {
            self.last_health_check_minute = Some(minute);
            self.enqueue_health_check().await;
        }
        if !self.health_check_minutes.contains(&minute) {
            self.last_health_check_minute = None;
        }

        if hour == self.daily_briefing_hour
            && minute == self.daily_briefing_minute
            && self.last_daily_briefing_minute != Some((hour, minute))
        {
            self.last_daily_briefing_minute = Some((hour, minute));
            self.enqueue_daily_briefing().await;
        }
        if !(hour == self.daily_briefing_hour && minute == self.daily_briefing_minute) {
            self.last_daily_briefing_minute = None;
        }
    }

    async fn enqueue_health_check(&self) {
        let job = JobEnvelope::new("health_check", serde_json::json!({}));
        if let Err(err) = self.queue.push(QUEUE_HEALTH_CHECK, &job).await {
            warn!(%err, "scheduler: failed to enqueue health_check");
        }
    }

    async fn enqueue_daily_briefing(&self) {
        let job = JobEnvelope::new("daily_briefing", serde_json::json!({}));
        if let Err(err) = self.queue.push(QUEUE_DAILY_BRIEFING, &job).await {
            warn!(%err, "scheduler: failed to enqueue daily_briefing");
        }
    }
}
