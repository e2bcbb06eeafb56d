//! Periodic refresh of cached per-capture detection counts.
//!
//! Spawns a background task that recomputes `captures.detections_count`
//! across all deployments. Counts drift when detections are written by
//! external processing backends that bypass the API. Runs on a fixed
//! interval using `tokio::time::interval`.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use ambi_pipeline::maintenance::update_detection_counts;

/// Run the detection-count refresh loop.
///
/// Recomputes counts every `interval_secs`. Runs until `cancel` is
/// triggered.
pub async fn run(pool: PgPool, interval_secs: u64, cancel: CancellationToken) {
    tracing::info!(interval_secs, "Detection count refresh job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Detection count refresh job stopping");
                break;
            }
            _ = interval.tick() => {
                match update_detection_counts(&pool, None).await {
                    Ok(updated) => {
                        if updated > 0 {
                            tracing::info!(updated, "Detection count refresh: corrected stale rows");
                        } else {
                            tracing::debug!("Detection count refresh: all counts current");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Detection count refresh failed");
                    }
                }
            }
        }
    }
}
