//! Repository for capture collections and their membership table.

use ambi_core::types::DbId;
use sqlx::PgPool;

use crate::models::collection::{
    CaptureCollection, CreateCaptureCollection, UpdateCaptureCollection,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, description, project_id, method, method_args, created_at, updated_at";

/// Provides read/write operations for capture collections.
pub struct CollectionRepo;

impl CollectionRepo {
    /// Insert a new collection, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCaptureCollection,
    ) -> Result<CaptureCollection, sqlx::Error> {
        let query = format!(
            "INSERT INTO capture_collections (name, description, project_id, method, method_args)
             VALUES ($1, COALESCE($2, ''), $3, $4, COALESCE($5, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CaptureCollection>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.project_id)
            .bind(&input.method)
            .bind(&input.method_args)
            .fetch_one(pool)
            .await
    }

    /// Find a collection by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CaptureCollection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM capture_collections WHERE id = $1");
        sqlx::query_as::<_, CaptureCollection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List collections for a project, ordered by name.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<CaptureCollection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM capture_collections WHERE project_id = $1 ORDER BY name"
        );
        sqlx::query_as::<_, CaptureCollection>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a collection. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCaptureCollection,
    ) -> Result<Option<CaptureCollection>, sqlx::Error> {
        let query = format!(
            "UPDATE capture_collections SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                method = COALESCE($4, method),
                method_args = COALESCE($5, method_args)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CaptureCollection>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.method)
            .bind(&input.method_args)
            .fetch_optional(pool)
            .await
    }

    /// Delete a collection by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM capture_collections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the collection's membership with the given capture IDs.
    ///
    /// Runs in a transaction so readers never see a half-replaced set.
    /// Returns the new member count.
    pub async fn replace_captures(
        pool: &PgPool,
        id: DbId,
        capture_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM capture_collection_images WHERE collection_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(
            "INSERT INTO capture_collection_images (collection_id, capture_id)
             SELECT $1, u.capture_id FROM UNNEST($2::bigint[]) AS u(capture_id)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(capture_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Member capture IDs, sorted ascending.
    pub async fn capture_ids(pool: &PgPool, id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT capture_id FROM capture_collection_images
             WHERE collection_id = $1
             ORDER BY capture_id",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// Number of member captures.
    pub async fn capture_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM capture_collection_images WHERE collection_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
