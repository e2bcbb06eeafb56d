//! Repository for the `storage_sources` table.

use ambi_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::storage::{CreateStorageSource, StorageSource, UpdateStorageSource};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, bucket, prefix, endpoint_url, public_base_url, \
                       total_files, total_size, last_checked, created_at, updated_at";

/// Provides CRUD operations for storage sources.
pub struct StorageRepo;

impl StorageRepo {
    /// Insert a new storage source, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateStorageSource,
    ) -> Result<StorageSource, sqlx::Error> {
        let query = format!(
            "INSERT INTO storage_sources (name, bucket, prefix, endpoint_url, public_base_url)
             VALUES ($1, $2, COALESCE($3, ''), $4, COALESCE($5, ''))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StorageSource>(&query)
            .bind(&input.name)
            .bind(&input.bucket)
            .bind(&input.prefix)
            .bind(&input.endpoint_url)
            .bind(&input.public_base_url)
            .fetch_one(pool)
            .await
    }

    /// Find a storage source by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<StorageSource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM storage_sources WHERE id = $1");
        sqlx::query_as::<_, StorageSource>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all storage sources ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<StorageSource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM storage_sources ORDER BY name");
        sqlx::query_as::<_, StorageSource>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a storage source. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStorageSource,
    ) -> Result<Option<StorageSource>, sqlx::Error> {
        let query = format!(
            "UPDATE storage_sources SET
                name = COALESCE($2, name),
                bucket = COALESCE($3, bucket),
                prefix = COALESCE($4, prefix),
                endpoint_url = COALESCE($5, endpoint_url),
                public_base_url = COALESCE($6, public_base_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StorageSource>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.bucket)
            .bind(&input.prefix)
            .bind(&input.endpoint_url)
            .bind(&input.public_base_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a storage source by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM storage_sources WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the cached file count and byte total after a listing pass.
    pub async fn set_totals(
        pool: &PgPool,
        id: DbId,
        total_files: i64,
        total_size: i64,
        last_checked: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE storage_sources
             SET total_files = $2, total_size = $3, last_checked = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(total_files)
        .bind(total_size)
        .bind(last_checked)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// IDs of all deployments configured to use this storage source.
    pub async fn deployment_ids(pool: &PgPool, id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM deployments WHERE data_source_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(pool)
            .await
    }
}
