//! Repository for the `captures` table.
//!
//! Besides CRUD this carries the bulk operations used by the grouping and
//! sync pipelines: distinct-timestamp listing, event reassignment, batched
//! upserts keyed on (deployment, path), and calculated-field refreshes.

use ambi_core::sampling::CaptureSample;
use ambi_core::types::{DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::capture::{Capture, CaptureUpsert, CreateCapture};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, path, public_base_url, timestamp, width, height, size, \
                       last_modified, checksum, checksum_algorithm, detections_count, \
                       deployment_id, project_id, event_id, created_at, updated_at";

/// Row shape fetched for sampling strategies.
#[derive(Debug, FromRow)]
struct SampleRow {
    id: DbId,
    event_id: Option<DbId>,
    timestamp: Option<Timestamp>,
    size: Option<i64>,
    detections_count: i64,
}

/// Provides read/write operations for captures.
pub struct CaptureRepo;

impl CaptureRepo {
    /// Manually register a capture, deriving project and public base URL
    /// from the deployment.
    pub async fn create(pool: &PgPool, input: &CreateCapture) -> Result<Capture, sqlx::Error> {
        let query = format!(
            "INSERT INTO captures
                (deployment_id, project_id, public_base_url, path, timestamp, size,
                 checksum, checksum_algorithm)
             SELECT d.id, d.project_id,
                    COALESCE((SELECT s.public_base_url FROM storage_sources s
                              WHERE s.id = d.data_source_id), ''),
                    $2, $3, $4, $5, $6
             FROM deployments d WHERE d.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Capture>(&query)
            .bind(input.deployment_id)
            .bind(&input.path)
            .bind(input.timestamp)
            .bind(input.size)
            .bind(&input.checksum)
            .bind(&input.checksum_algorithm)
            .fetch_one(pool)
            .await
    }

    /// Find a capture by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Capture>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM captures WHERE id = $1");
        sqlx::query_as::<_, Capture>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List captures belonging to an event, in timestamp order.
    pub async fn list_by_event(pool: &PgPool, event_id: DbId) -> Result<Vec<Capture>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captures WHERE event_id = $1 ORDER BY timestamp, id"
        );
        sqlx::query_as::<_, Capture>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// List a page of captures for a deployment, in timestamp order.
    pub async fn list_by_deployment(
        pool: &PgPool,
        deployment_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Capture>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captures
             WHERE deployment_id = $1
             ORDER BY timestamp NULLS LAST, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Capture>(&query)
            .bind(deployment_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete a capture by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM captures WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Distinct non-null timestamps for a deployment, sorted ascending.
    ///
    /// This is the grouping pipeline's input; null-timestamp captures stay
    /// ungrouped until a timestamp is assigned.
    pub async fn distinct_timestamps(
        pool: &PgPool,
        deployment_id: DbId,
    ) -> Result<Vec<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT timestamp FROM captures
             WHERE deployment_id = $1 AND timestamp IS NOT NULL
             ORDER BY timestamp",
        )
        .bind(deployment_id)
        .fetch_all(pool)
        .await
    }

    /// Timestamps shared by more than one capture of the deployment.
    pub async fn duplicate_timestamps(
        pool: &PgPool,
        deployment_id: DbId,
    ) -> Result<Vec<(Timestamp, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT timestamp, COUNT(*) FROM captures
             WHERE deployment_id = $1 AND timestamp IS NOT NULL
             GROUP BY timestamp HAVING COUNT(*) > 1
             ORDER BY timestamp",
        )
        .bind(deployment_id)
        .fetch_all(pool)
        .await
    }

    /// Assign every capture of the deployment whose timestamp is in `timestamps`
    /// to the given event. Returns the number of captures moved.
    pub async fn assign_event(
        pool: &PgPool,
        deployment_id: DbId,
        timestamps: &[Timestamp],
        event_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE captures SET event_id = $3
             WHERE deployment_id = $1 AND timestamp = ANY($2)",
        )
        .bind(deployment_id)
        .bind(timestamps)
        .bind(event_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of captures stored for a deployment.
    pub async fn count_by_deployment(
        pool: &PgPool,
        deployment_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM captures WHERE deployment_id = $1")
            .bind(deployment_id)
            .fetch_one(pool)
            .await
    }

    /// Insert-or-update a batch of synced captures keyed on (deployment, path).
    ///
    /// Existing rows get refreshed object metadata only; timestamps and event
    /// assignments are preserved. Returns the number of rows written.
    pub async fn upsert_batch(
        pool: &PgPool,
        deployment_id: DbId,
        batch: &[CaptureUpsert],
    ) -> Result<u64, sqlx::Error> {
        if batch.is_empty() {
            return Ok(0);
        }

        let paths: Vec<&str> = batch.iter().map(|c| c.path.as_str()).collect();
        let base_urls: Vec<&str> = batch.iter().map(|c| c.public_base_url.as_str()).collect();
        let timestamps: Vec<Option<Timestamp>> = batch.iter().map(|c| c.timestamp).collect();
        let sizes: Vec<Option<i64>> = batch.iter().map(|c| c.size).collect();
        let modified: Vec<Option<Timestamp>> = batch.iter().map(|c| c.last_modified).collect();
        let checksums: Vec<Option<&str>> =
            batch.iter().map(|c| c.checksum.as_deref()).collect();
        let checksum_algorithms: Vec<Option<&str>> = batch
            .iter()
            .map(|c| c.checksum_algorithm.as_deref())
            .collect();

        let result = sqlx::query(
            "INSERT INTO captures
                (deployment_id, project_id, path, public_base_url, timestamp, size,
                 last_modified, checksum, checksum_algorithm)
             SELECT $1, (SELECT project_id FROM deployments WHERE id = $1),
                    u.path, u.public_base_url, u.ts, u.size, u.last_modified,
                    u.checksum, u.checksum_algorithm
             FROM UNNEST($2::text[], $3::text[], $4::timestamptz[], $5::bigint[],
                         $6::timestamptz[], $7::text[], $8::text[])
                  AS u(path, public_base_url, ts, size, last_modified, checksum,
                       checksum_algorithm)
             ON CONFLICT ON CONSTRAINT uq_captures_deployment_path
             DO UPDATE SET
                last_modified = EXCLUDED.last_modified,
                size = EXCLUDED.size,
                checksum = EXCLUDED.checksum,
                checksum_algorithm = EXCLUDED.checksum_algorithm",
        )
        .bind(deployment_id)
        .bind(&paths)
        .bind(&base_urls)
        .bind(&timestamps)
        .bind(&sizes)
        .bind(&modified)
        .bind(&checksums)
        .bind(&checksum_algorithms)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Fetch the lightweight rows sampling strategies operate on, scoped to
    /// one project.
    pub async fn samples_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<CaptureSample>, sqlx::Error> {
        let rows: Vec<SampleRow> = sqlx::query_as(
            "SELECT c.id, c.event_id, c.timestamp, c.size,
                    (SELECT COUNT(*) FROM detections d WHERE d.capture_id = c.id)
                        AS detections_count
             FROM captures c
             WHERE c.project_id = $1
             ORDER BY c.id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CaptureSample {
                id: r.id,
                event_id: r.event_id,
                timestamp: r.timestamp,
                size: r.size,
                detections_count: r.detections_count,
            })
            .collect())
    }

    /// Refresh the cached `detections_count` with one bulk update.
    ///
    /// Scoped to a deployment when given, global otherwise. Returns the
    /// number of captures updated.
    pub async fn refresh_detection_counts(
        pool: &PgPool,
        deployment_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE captures c SET detections_count = sub.count
             FROM (
                SELECT c2.id, COUNT(d.id) AS count
                FROM captures c2
                LEFT JOIN detections d ON d.capture_id = c2.id
                WHERE ($1::BIGINT IS NULL OR c2.deployment_id = $1)
                GROUP BY c2.id
             ) AS sub
             WHERE c.id = sub.id
               AND c.detections_count IS DISTINCT FROM sub.count",
        )
        .bind(deployment_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Rewrite the cached public base URL on all captures of a deployment.
    pub async fn set_public_base_url(
        pool: &PgPool,
        deployment_id: DbId,
        base_url: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE captures SET public_base_url = $2 WHERE deployment_id = $1",
        )
        .bind(deployment_id)
        .bind(base_url)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Dimensions of the first capture in the event that has them.
    pub async fn first_dimensions_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Option<(i32, i32)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT width, height FROM captures
             WHERE event_id = $1 AND width IS NOT NULL AND height IS NOT NULL
             ORDER BY timestamp, id
             LIMIT 1",
        )
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    /// Bulk-apply dimensions to the event's captures.
    ///
    /// Only fills missing dimensions unless `replace_existing` is set.
    pub async fn set_dimensions_for_event(
        pool: &PgPool,
        event_id: DbId,
        width: i32,
        height: i32,
        replace_existing: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE captures SET width = $2, height = $3
             WHERE event_id = $1
               AND ($4 OR (width IS NULL AND height IS NULL))",
        )
        .bind(event_id)
        .bind(width)
        .bind(height)
        .bind(replace_existing)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
