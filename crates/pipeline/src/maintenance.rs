//! Calculated-field maintenance: cached counts, URLs and dimensions.
//!
//! All of these are derived values that can be recomputed at any time, so
//! every operation here is a plain bulk refresh safe to rerun.

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use tracing::{info, warn};

use ambi_db::repositories::{CaptureRepo, EventRepo, StorageRepo};
use ambi_db::DbPool;

use crate::error::PipelineError;

/// Refresh the cached per-capture detection counts.
///
/// Scoped to one deployment when given. Returns the number of captures
/// whose count actually changed.
pub async fn update_detection_counts(
    pool: &DbPool,
    deployment_id: Option<DbId>,
) -> Result<u64, PipelineError> {
    let updated = CaptureRepo::refresh_detection_counts(pool, deployment_id).await?;
    info!(?deployment_id, updated, "refreshed detection counts");
    Ok(updated)
}

/// Push a storage source's public base URL out to the cached copies on all
/// captures of its deployments.
pub async fn update_public_base_urls(
    pool: &DbPool,
    storage_source_id: DbId,
) -> Result<u64, PipelineError> {
    let source = StorageRepo::find_by_id(pool, storage_source_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "storage source",
            id: storage_source_id,
        })?;

    let mut updated = 0;
    for deployment_id in StorageRepo::deployment_ids(pool, storage_source_id).await? {
        updated +=
            CaptureRepo::set_public_base_url(pool, deployment_id, &source.public_base_url).await?;
    }
    info!(storage_source_id, updated, "rewrote cached public base URLs");
    Ok(updated)
}

/// Backfill image dimensions across an event from its first measured capture.
///
/// Captures of one session share a camera configuration, so one measured
/// member is enough. Returns the number of captures updated; zero when no
/// member has dimensions yet.
pub async fn backfill_event_dimensions(
    pool: &DbPool,
    event_id: DbId,
    replace_existing: bool,
) -> Result<u64, PipelineError> {
    EventRepo::find_by_id(pool, event_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "event",
            id: event_id,
        })?;

    let Some((width, height)) = CaptureRepo::first_dimensions_for_event(pool, event_id).await?
    else {
        warn!(event_id, "no capture in event has dimensions, skipping backfill");
        return Ok(0);
    };
    let updated =
        CaptureRepo::set_dimensions_for_event(pool, event_id, width, height, replace_existing)
            .await?;
    info!(event_id, width, height, updated, "backfilled event dimensions");
    Ok(updated)
}
