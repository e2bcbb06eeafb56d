//! Repository for the `deployments` table.

use ambi_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::deployment::{CreateDeployment, Deployment, UpdateDeployment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, project_id, data_source_id, \
                       data_source_subdir, data_source_regex, data_source_total_files, \
                       data_source_total_size, data_source_last_checked, \
                       latitude, longitude, created_at, updated_at";

/// Provides CRUD operations for deployments.
pub struct DeploymentRepo;

impl DeploymentRepo {
    /// Insert a new deployment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDeployment,
    ) -> Result<Deployment, sqlx::Error> {
        let query = format!(
            "INSERT INTO deployments
                (name, description, project_id, data_source_id,
                 data_source_subdir, data_source_regex, latitude, longitude)
             VALUES ($1, COALESCE($2, ''), $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.project_id)
            .bind(input.data_source_id)
            .bind(&input.data_source_subdir)
            .bind(&input.data_source_regex)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_one(pool)
            .await
    }

    /// Find a deployment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deployments WHERE id = $1");
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all deployments for a given project, ordered by name.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Deployment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM deployments WHERE project_id = $1 ORDER BY name");
        sqlx::query_as::<_, Deployment>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a deployment. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDeployment,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!(
            "UPDATE deployments SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                data_source_id = COALESCE($4, data_source_id),
                data_source_subdir = COALESCE($5, data_source_subdir),
                data_source_regex = COALESCE($6, data_source_regex),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.data_source_id)
            .bind(&input.data_source_subdir)
            .bind(&input.data_source_regex)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_optional(pool)
            .await
    }

    /// Delete a deployment by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deployments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the data-source stats observed during a sync pass.
    pub async fn set_sync_stats(
        pool: &PgPool,
        id: DbId,
        total_files: i64,
        total_size: i64,
        last_checked: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE deployments SET
                data_source_total_files = GREATEST(COALESCE(data_source_total_files, 0), $2),
                data_source_total_size = GREATEST(COALESCE(data_source_total_size, 0), $3),
                data_source_last_checked = $4
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

    /// Recompute the cached capture totals from the captures actually stored.
    ///
    /// Best-effort calculated fields: failures here must never block the
    /// operation that triggered the refresh.
    pub async fn refresh_capture_totals(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE deployments SET
                data_source_total_files = sub.count,
                data_source_total_size = sub.total
             FROM (
                SELECT COUNT(*) AS count, COALESCE(SUM(size), 0) AS total
                FROM captures WHERE deployment_id = $1
             ) AS sub
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
