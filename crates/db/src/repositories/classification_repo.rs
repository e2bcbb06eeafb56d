//! Repositories for the `algorithms` and `classifications` tables.

use ambi_core::types::DbId;
use sqlx::PgPool;

use crate::models::classification::{Algorithm, Classification, CreateClassification};

const ALGORITHM_COLUMNS: &str = "id, name, version, description, created_at, updated_at";
const CLASSIFICATION_COLUMNS: &str =
    "id, detection_id, taxon_id, algorithm_id, score, timestamp, created_at";

/// Provides read/write operations for algorithms.
pub struct AlgorithmRepo;

impl AlgorithmRepo {
    /// Fetch the algorithm for (name, version), creating it if missing.
    pub async fn get_or_create(
        pool: &PgPool,
        name: &str,
        version: &str,
    ) -> Result<Algorithm, sqlx::Error> {
        let query = format!(
            "INSERT INTO algorithms (name, version)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_algorithms_name_version
             DO UPDATE SET name = EXCLUDED.name
             RETURNING {ALGORITHM_COLUMNS}"
        );
        sqlx::query_as::<_, Algorithm>(&query)
            .bind(name)
            .bind(version)
            .fetch_one(pool)
            .await
    }

    /// Find an algorithm by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Algorithm>, sqlx::Error> {
        let query = format!("SELECT {ALGORITHM_COLUMNS} FROM algorithms WHERE id = $1");
        sqlx::query_as::<_, Algorithm>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all algorithms ordered by name and version.
    pub async fn list(pool: &PgPool) -> Result<Vec<Algorithm>, sqlx::Error> {
        let query = format!("SELECT {ALGORITHM_COLUMNS} FROM algorithms ORDER BY name, version");
        sqlx::query_as::<_, Algorithm>(&query).fetch_all(pool).await
    }
}

/// Provides read/write operations for classifications.
pub struct ClassificationRepo;

impl ClassificationRepo {
    /// Register a machine prediction. A missing timestamp defaults to now.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClassification,
    ) -> Result<Classification, sqlx::Error> {
        let query = format!(
            "INSERT INTO classifications (detection_id, taxon_id, algorithm_id, score, timestamp)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
             RETURNING {CLASSIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, Classification>(&query)
            .bind(input.detection_id)
            .bind(input.taxon_id)
            .bind(input.algorithm_id)
            .bind(input.score)
            .bind(input.timestamp)
            .fetch_one(pool)
            .await
    }

    /// List classifications for a detection, best score first.
    pub async fn list_by_detection(
        pool: &PgPool,
        detection_id: DbId,
    ) -> Result<Vec<Classification>, sqlx::Error> {
        let query = format!(
            "SELECT {CLASSIFICATION_COLUMNS} FROM classifications
             WHERE detection_id = $1
             ORDER BY score DESC NULLS LAST, created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Classification>(&query)
            .bind(detection_id)
            .fetch_all(pool)
            .await
    }
}
