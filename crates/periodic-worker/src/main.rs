mod config;
mod jobs;
mod queue;
mod scheduler;
mod worker;

use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use config::WorkerSettings;
use queue::JobQueue;
use scheduler::Scheduler;
use worker::WorkerPool;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = WorkerSettings::from_env();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.concurrency)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(settings))
}

async fn async_main(settings: WorkerSettings) -> anyhow::Result<()> {
    let queue = Arc::new(JobQueue::connect(&settings.redis_url, settings.job_result_ttl).await?);

    let scheduler = Scheduler::new(queue.clone(), &settings);
    let pool = Arc::new(WorkerPool::new(queue, settings));

    tracing::info!("periodic worker starting");

    tokio::select! {
        _ = scheduler.run() => {},
        _ = pool.run() => {},
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
