//! Repository for the `detections` table.

use ambi_core::types::DbId;
use sqlx::PgPool;

use crate::models::detection::{CreateDetection, Detection};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, capture_id, occurrence_id, timestamp, bbox_x, bbox_y, \
                       bbox_width, bbox_height, crop_path, created_at, updated_at";

/// Provides read/write operations for detections.
pub struct DetectionRepo;

impl DetectionRepo {
    /// Insert a new detection. The timestamp defaults to the capture's when
    /// not supplied.
    pub async fn create(pool: &PgPool, input: &CreateDetection) -> Result<Detection, sqlx::Error> {
        let query = format!(
            "INSERT INTO detections
                (capture_id, occurrence_id, timestamp, bbox_x, bbox_y,
                 bbox_width, bbox_height, crop_path)
             VALUES ($1, $2,
                     COALESCE($3, (SELECT timestamp FROM captures WHERE id = $1)),
                     $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Detection>(&query)
            .bind(input.capture_id)
            .bind(input.occurrence_id)
            .bind(input.timestamp)
            .bind(input.bbox_x)
            .bind(input.bbox_y)
            .bind(input.bbox_width)
            .bind(input.bbox_height)
            .bind(&input.crop_path)
            .fetch_one(pool)
            .await
    }

    /// Find a detection by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Detection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM detections WHERE id = $1");
        sqlx::query_as::<_, Detection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List detections on a capture, ordered by ID.
    pub async fn list_by_capture(
        pool: &PgPool,
        capture_id: DbId,
    ) -> Result<Vec<Detection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM detections WHERE capture_id = $1 ORDER BY id");
        sqlx::query_as::<_, Detection>(&query)
            .bind(capture_id)
            .fetch_all(pool)
            .await
    }

    /// List detections linked to an occurrence, in timestamp order.
    pub async fn list_by_occurrence(
        pool: &PgPool,
        occurrence_id: DbId,
    ) -> Result<Vec<Detection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM detections
             WHERE occurrence_id = $1
             ORDER BY timestamp NULLS LAST, id"
        );
        sqlx::query_as::<_, Detection>(&query)
            .bind(occurrence_id)
            .fetch_all(pool)
            .await
    }

    /// Attach a detection to an occurrence (the tracking step).
    pub async fn set_occurrence(
        pool: &PgPool,
        id: DbId,
        occurrence_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE detections SET occurrence_id = $2 WHERE id = $1")
            .bind(id)
            .bind(occurrence_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a detection by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM detections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
