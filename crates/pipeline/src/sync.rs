//! Capture sync: reconcile a deployment's captures with its object store.
//!
//! The lister is a trait so the worker can plug in the real S3 client and
//! tests can use an in-memory store. Objects land through a batched upsert
//! keyed on (deployment, path), so reruns refresh metadata instead of
//! duplicating rows.

use ambi_core::error::CoreError;
use ambi_core::filenames;
use ambi_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};

use ambi_db::models::capture::CaptureUpsert;
use ambi_db::models::storage::StorageSource;
use ambi_db::repositories::{CaptureRepo, DeploymentRepo, StorageRepo};
use ambi_db::DbPool;

use crate::error::PipelineError;

/// Rows per upsert statement. Keeps bind arrays and statement time bounded
/// on deployments with hundreds of thousands of objects.
const SYNC_BATCH_SIZE: usize = 500;

/// One object listed from the store, keyed relative to the source prefix.
#[derive(Debug, Clone)]
pub struct RemoteObject {
    pub key: String,
    pub size: Option<i64>,
    pub last_modified: Option<Timestamp>,
    pub checksum: Option<String>,
    pub checksum_algorithm: Option<String>,
}

/// Lists the objects under a storage source, optionally below a subdir.
#[async_trait]
pub trait ObjectStoreLister: Send + Sync {
    async fn list_objects(
        &self,
        source: &StorageSource,
        subdir: Option<&str>,
    ) -> Result<Vec<RemoteObject>, PipelineError>;
}

/// Summary of one sync pass over a deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOutcome {
    pub total_files: i64,
    pub total_size: i64,
    pub rows_written: u64,
}

/// Sync a deployment's captures from its configured storage source.
///
/// Objects are filtered by the deployment's path regex when set, stamped
/// with a timestamp extracted from the filename, and upserted in batches.
/// A deployment without a data source is a configuration error, not a
/// retryable failure.
pub async fn sync_deployment_captures(
    pool: &DbPool,
    lister: &dyn ObjectStoreLister,
    deployment_id: DbId,
) -> Result<SyncOutcome, PipelineError> {
    let deployment = DeploymentRepo::find_by_id(pool, deployment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "deployment",
            id: deployment_id,
        })?;
    let source_id = deployment.data_source_id.ok_or_else(|| {
        CoreError::Configuration(format!(
            "deployment {deployment_id} has no data source configured"
        ))
    })?;
    let source = StorageRepo::find_by_id(pool, source_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "storage source",
            id: source_id,
        })?;

    let path_filter = match deployment.data_source_regex.as_deref() {
        Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
            CoreError::Configuration(format!(
                "deployment {deployment_id} has an invalid path regex: {e}"
            ))
        })?),
        None => None,
    };

    let objects = lister
        .list_objects(&source, deployment.data_source_subdir.as_deref())
        .await?;

    let mut outcome = SyncOutcome::default();
    let mut batch: Vec<CaptureUpsert> = Vec::with_capacity(SYNC_BATCH_SIZE);
    for object in &objects {
        if let Some(filter) = &path_filter {
            if !filter.is_match(&object.key) {
                continue;
            }
        }
        outcome.total_files += 1;
        outcome.total_size += object.size.unwrap_or(0);
        batch.push(CaptureUpsert {
            path: object.key.clone(),
            public_base_url: source.public_base_url.clone(),
            timestamp: filenames::timestamp_from_path(&object.key),
            size: object.size,
            last_modified: object.last_modified,
            checksum: object.checksum.clone(),
            checksum_algorithm: object.checksum_algorithm.clone(),
        });
        if batch.len() >= SYNC_BATCH_SIZE {
            outcome.rows_written += CaptureRepo::upsert_batch(pool, deployment_id, &batch).await?;
            batch.clear();
        }
    }
    outcome.rows_written += CaptureRepo::upsert_batch(pool, deployment_id, &batch).await?;

    let now = Utc::now();
    DeploymentRepo::set_sync_stats(
        pool,
        deployment_id,
        outcome.total_files,
        outcome.total_size,
        now,
    )
    .await?;
    StorageRepo::set_totals(pool, source_id, objects.len() as i64, outcome.total_size, now)
        .await?;

    let stored = CaptureRepo::count_by_deployment(pool, deployment_id).await?;
    if stored != outcome.total_files {
        // Expected when objects were removed from the store; captures are
        // never deleted by sync.
        warn!(
            deployment_id,
            listed = outcome.total_files,
            stored,
            "stored capture count differs from listing"
        );
    }

    info!(
        deployment_id,
        files = outcome.total_files,
        bytes = outcome.total_size,
        rows_written = outcome.rows_written,
        "synced deployment captures"
    );
    Ok(outcome)
}
