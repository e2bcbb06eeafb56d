//! Background worker: polls the task queue and runs pipeline operations.
//!
//! Tasks are claimed with `FOR UPDATE SKIP LOCKED`, so any number of worker
//! processes can share one queue. Every pipeline operation dispatched here
//! is safe to rerun, which is what makes at-least-once delivery acceptable.

mod s3;

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ambi_db::models::task::{
    Task, TASK_POPULATE_COLLECTION, TASK_REGROUP_EVENTS, TASK_SYNC_CAPTURES,
    TASK_UPDATE_DETECTION_COUNTS, TASK_UPDATE_PUBLIC_URLS,
};
use ambi_db::repositories::{EventRepo, TaskRepo};
use ambi_pipeline::{collections, grouping, maintenance, sync, PipelineError};

use s3::S3Lister;

/// How long to sleep when the queue is empty.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Attempts before a task sticks as failed.
const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// Finished tasks older than this are pruned.
const DEFAULT_TASK_RETENTION_DAYS: i32 = 30;

/// How often the prune pass runs.
const PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ambi_worker=debug,ambi_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = ambi_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    ambi_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection pool created");

    let poll_interval = env_parse("WORKER_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS);
    let max_attempts = env_parse("WORKER_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS);
    let retention_days = env_parse("TASK_RETENTION_DAYS", DEFAULT_TASK_RETENTION_DAYS);

    let lister = S3Lister::from_env().await;
    let cancel = CancellationToken::new();

    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_cancel.cancel();
    });

    tracing::info!(poll_interval, max_attempts, "Worker started");
    run_loop(
        &pool,
        &lister,
        poll_interval,
        max_attempts,
        retention_days,
        cancel,
    )
    .await;
    tracing::info!("Worker stopped");
}

/// Poll-claim-dispatch loop. Drains the queue, then sleeps `poll_interval`
/// seconds. Runs until `cancel` is triggered.
async fn run_loop(
    pool: &PgPool,
    lister: &S3Lister,
    poll_interval: u64,
    max_attempts: i32,
    retention_days: i32,
    cancel: CancellationToken,
) {
    let mut prune = tokio::time::interval(PRUNE_INTERVAL);

    loop {
        match TaskRepo::claim_next(pool).await {
            Ok(Some(task)) => {
                let task_id = task.id;
                tracing::info!(
                    task_id,
                    task_name = %task.task_name,
                    entity_id = task.entity_id,
                    attempt = task.attempts,
                    "Running task"
                );
                match run_task(pool, lister, &task).await {
                    Ok(()) => {
                        if let Err(e) = TaskRepo::mark_done(pool, task_id).await {
                            tracing::error!(task_id, error = %e, "Failed to mark task done");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(task_id, error = %e, "Task failed");
                        if let Err(e) =
                            TaskRepo::mark_failed(pool, task_id, &e.to_string(), max_attempts).await
                        {
                            tracing::error!(task_id, error = %e, "Failed to record task failure");
                        }
                    }
                }
                // Keep draining without sleeping while work is available.
                if cancel.is_cancelled() {
                    break;
                }
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to claim task");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(poll_interval)) => {}
            _ = prune.tick() => {
                match TaskRepo::prune_done(pool, retention_days).await {
                    Ok(pruned) if pruned > 0 => {
                        tracing::info!(pruned, "Pruned finished tasks");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "Task prune failed"),
                }
            }
        }
    }
}

/// Dispatch one claimed task to its pipeline operation.
async fn run_task(pool: &PgPool, lister: &S3Lister, task: &Task) -> Result<(), PipelineError> {
    match task.task_name.as_str() {
        TASK_REGROUP_EVENTS => {
            grouping::regroup_deployment_captures(pool, task.entity_id, None).await?;
        }
        TASK_SYNC_CAPTURES => {
            sync::sync_deployment_captures(pool, lister, task.entity_id).await?;
            // Freshly synced captures need session assignment, and new
            // sessions inherit dimensions from their first measured member.
            grouping::regroup_deployment_captures(pool, task.entity_id, None).await?;
            for event in EventRepo::list_by_deployment(pool, task.entity_id).await? {
                maintenance::backfill_event_dimensions(pool, event.id, false).await?;
            }
        }
        TASK_POPULATE_COLLECTION => {
            collections::populate_collection(pool, task.entity_id).await?;
        }
        TASK_UPDATE_DETECTION_COUNTS => {
            maintenance::update_detection_counts(pool, Some(task.entity_id)).await?;
        }
        TASK_UPDATE_PUBLIC_URLS => {
            maintenance::update_public_base_urls(pool, task.entity_id).await?;
        }
        other => {
            return Err(ambi_core::error::CoreError::Validation(format!(
                "unknown task name: {other}"
            ))
            .into());
        }
    }
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
