use std::sync::Arc;

use serde_json::json;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::WorkerSettings;
use crate::jobs::{self, JobOutcome};
use crate::queue::JobQueue;

/// Pulls jobs off the shared queue and runs them under a concurrency cap,
/// a per-job timeout, and a retry-with-max-tries policy.
pub struct WorkerPool {
    queue: Arc<JobQueue>,
    settings: WorkerSettings,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(queue: Arc<JobQueue>, settings: WorkerSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.concurrency));
        WorkerPool { queue, settings, permits }
    }

    pub async fn run(self: Arc<Self>) {
        info!(concurrency = self.settings.concurrency, "worker: starting pool");
        loop {
            let job = match self.queue.pop_any(1.0).await {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(err) => {
                    error!(%err, "worker: queue pop failed");
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                    continue;
                }
            };

            let permit = self.permits.clone().acquire_owned().await.expect("semaphore closed");
            let this = self.clone();
            tokio::spawn(async move {
                this.process(job).await;
                drop(permit);
            });
        }
    }

    async fn process(&self, job: crate::queue::JobEnvelope) {
        info!(job_id = %job.id, kind = %job.kind, attempt = job.attempt, "worker: processing job");

        let outcome = tokio::time::timeout(self.settings.job_timeout, jobs::run(&job.kind, &job.payload, &self.settings)).await;

        let (result_body, should_retry) = match outcome {
            Ok(JobOutcome::Ok(value)) => {
                info!(job_id = %job.id, kind = %job.kind, "worker: job succeeded");
                (json!({"ok": true, "result": value}), false)
            }
            Ok(JobOutcome::Failed(err)) => {
                warn!(job_id = %job.id, kind = %job.kind, error = %err, "worker: job failed");
                (json!({"ok": false, "error": err}), true)
            }
            Err(_elapsed) => {
                warn!(job_id = %job.id, kind = %job.kind, "worker: job timed out");
                (json!({"ok": false, "error": "timed out"}), true)
            }
        };

        if should_retry && job.attempt + 1 < self.settings.max_tries {
            let mut retried = job.clone();
            retried.attempt += 1;
            let key = JobQueue::queue_key_for(&retried.kind);
            if let Err(err) = self.queue.push(key, &retried).await {
                error!(job_id = %job.id, %err, "worker: failed to re-push job for retry");
            }
            return;
        }

        if should_retry {
            error!(job_id = %job.id, kind = %job.kind, "worker: retries exhausted, dropping job");
        }

        if let Err(err) = self.queue.store_result(job.id, &result_body.to_string()).await {
            error!(job_id = %job.id, %err, "worker: failed to store job result");
        }
    }
}
