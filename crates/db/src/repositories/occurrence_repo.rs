//! Repository for the `occurrences` table.
//!
//! The methods consumed by the determination resolver take
//! `impl PgExecutor` so the pipeline can run the whole state transition
//! inside one transaction.

use ambi_core::types::{DbId, Timestamp};
use sqlx::postgres::Postgres;
use sqlx::{Executor, FromRow, PgPool};

use crate::models::identification::Identification;
use crate::models::occurrence::{CreateOccurrence, Occurrence};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, determination_id, event_id, deployment_id, project_id, created_at, updated_at";

/// The winning machine prediction for an occurrence.
///
/// One classification per algorithm is considered (its top score); the
/// overall winner is the highest score, breaking exact ties by most recent
/// creation.
#[derive(Debug, Clone, FromRow)]
pub struct BestPrediction {
    pub classification_id: DbId,
    pub taxon_id: DbId,
    pub score: f64,
    pub created_at: Timestamp,
}

/// Provides read/write operations for occurrences.
pub struct OccurrenceRepo;

impl OccurrenceRepo {
    /// Insert a new occurrence, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOccurrence,
    ) -> Result<Occurrence, sqlx::Error> {
        let query = format!(
            "INSERT INTO occurrences (event_id, deployment_id, project_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Occurrence>(&query)
            .bind(input.event_id)
            .bind(input.deployment_id)
            .bind(input.project_id)
            .fetch_one(pool)
            .await
    }

    /// Find an occurrence by its internal ID.
    pub async fn find_by_id<'e, E>(exec: E, id: DbId) -> Result<Option<Occurrence>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {COLUMNS} FROM occurrences WHERE id = $1");
        sqlx::query_as::<_, Occurrence>(&query)
            .bind(id)
            .fetch_optional(exec)
            .await
    }

    /// List occurrences for an event, ordered by ID.
    pub async fn list_by_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<Occurrence>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM occurrences WHERE event_id = $1 ORDER BY id");
        sqlx::query_as::<_, Occurrence>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the cached determination. Skips the write when the stored
    /// value already matches, so redundant resolver runs leave the row (and
    /// its `updated_at`) untouched. Returns whether the row changed.
    pub async fn set_determination<'e, E>(
        exec: E,
        id: DbId,
        taxon_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE occurrences SET determination_id = $2
             WHERE id = $1 AND determination_id IS DISTINCT FROM $2",
        )
        .bind(id)
        .bind(taxon_id)
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The latest non-withdrawn identification, if any.
    ///
    /// Human identifications always outrank machine predictions, so when
    /// this returns a row the resolver uses its taxon directly.
    pub async fn best_identification<'e, E>(
        exec: E,
        occurrence_id: DbId,
    ) -> Result<Option<Identification>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Identification>(
            "SELECT id, occurrence_id, user_id, taxon_id, withdrawn, created_at, updated_at
             FROM identifications
             WHERE occurrence_id = $1 AND withdrawn = FALSE
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(occurrence_id)
        .fetch_optional(exec)
        .await
    }

    /// The winning machine prediction across all the occurrence's detections.
    ///
    /// Only each algorithm's top-scoring classification competes; among
    /// those, the highest score wins and exact ties go to the most recently
    /// created row.
    pub async fn best_prediction<'e, E>(
        exec: E,
        occurrence_id: DbId,
    ) -> Result<Option<BestPrediction>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, BestPrediction>(
            "SELECT c.id AS classification_id, c.taxon_id, c.score, c.created_at
             FROM classifications c
             JOIN detections d ON d.id = c.detection_id
             WHERE d.occurrence_id = $1
               AND c.taxon_id IS NOT NULL
               AND c.score IS NOT NULL
               AND c.score = (
                    SELECT MAX(c2.score)
                    FROM classifications c2
                    JOIN detections d2 ON d2.id = c2.detection_id
                    WHERE d2.occurrence_id = $1
                      AND c2.algorithm_id IS NOT DISTINCT FROM c.algorithm_id
                      AND c2.taxon_id IS NOT NULL
                      AND c2.score IS NOT NULL
               )
             ORDER BY c.score DESC, c.created_at DESC, c.id DESC
             LIMIT 1",
        )
        .bind(occurrence_id)
        .fetch_optional(exec)
        .await
    }

    /// Score backing the current determination, when it came from a machine
    /// prediction. Human identifications have no score.
    pub async fn determination_score(
        pool: &PgPool,
        occurrence_id: DbId,
    ) -> Result<Option<f64>, sqlx::Error> {
        if Self::best_identification(pool, occurrence_id).await?.is_some() {
            return Ok(None);
        }
        Ok(Self::best_prediction(pool, occurrence_id)
            .await?
            .map(|p| p.score))
    }

    /// Delete an occurrence by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM occurrences WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
