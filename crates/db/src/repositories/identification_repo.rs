//! Repository for the `identifications` table.
//!
//! Writes here are building blocks of the determination state machine; the
//! transaction-sensitive methods take `impl PgExecutor` so the pipeline
//! composes them atomically.

use ambi_core::types::DbId;
use sqlx::postgres::Postgres;
use sqlx::{Executor, PgPool};

use crate::models::identification::{CreateIdentification, Identification};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, occurrence_id, user_id, taxon_id, withdrawn, created_at, updated_at";

/// Provides read/write operations for identifications.
pub struct IdentificationRepo;

impl IdentificationRepo {
    /// Insert an identification row as-is.
    ///
    /// Callers wanting the one-active-per-user invariant must pair this
    /// with [`IdentificationRepo::withdraw_others`] in one transaction.
    pub async fn insert<'e, E>(
        exec: E,
        input: &CreateIdentification,
    ) -> Result<Identification, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO identifications (occurrence_id, user_id, taxon_id, withdrawn)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Identification>(&query)
            .bind(input.occurrence_id)
            .bind(input.user_id)
            .bind(input.taxon_id)
            .bind(input.withdrawn)
            .fetch_one(exec)
            .await
    }

    /// Withdraw every other active identification by the same user on the
    /// same occurrence. Returns the number withdrawn.
    pub async fn withdraw_others<'e, E>(
        exec: E,
        occurrence_id: DbId,
        user_id: Option<DbId>,
        keep_id: DbId,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE identifications SET withdrawn = TRUE
             WHERE occurrence_id = $1
               AND user_id IS NOT DISTINCT FROM $2
               AND id <> $3
               AND withdrawn = FALSE",
        )
        .bind(occurrence_id)
        .bind(user_id)
        .bind(keep_id)
        .execute(exec)
        .await?;
        Ok(result.rows_affected())
    }

    /// Set the withdrawn flag on a single identification.
    pub async fn set_withdrawn<'e, E>(
        exec: E,
        id: DbId,
        withdrawn: bool,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE identifications SET withdrawn = $2 WHERE id = $1")
            .bind(id)
            .bind(withdrawn)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The user's most recently withdrawn identification on the occurrence.
    ///
    /// Used to restore the user's previous opinion when their current one
    /// is deleted.
    pub async fn most_recent_withdrawn<'e, E>(
        exec: E,
        occurrence_id: DbId,
        user_id: Option<DbId>,
    ) -> Result<Option<Identification>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM identifications
             WHERE occurrence_id = $1
               AND user_id IS NOT DISTINCT FROM $2
               AND withdrawn = TRUE
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Identification>(&query)
            .bind(occurrence_id)
            .bind(user_id)
            .fetch_optional(exec)
            .await
    }

    /// Find an identification by its internal ID.
    pub async fn find_by_id<'e, E>(exec: E, id: DbId) -> Result<Option<Identification>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {COLUMNS} FROM identifications WHERE id = $1");
        sqlx::query_as::<_, Identification>(&query)
            .bind(id)
            .fetch_optional(exec)
            .await
    }

    /// List all identifications for an occurrence, newest first.
    pub async fn list_by_occurrence(
        pool: &PgPool,
        occurrence_id: DbId,
    ) -> Result<Vec<Identification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM identifications
             WHERE occurrence_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Identification>(&query)
            .bind(occurrence_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an identification row. Returns `true` if a row was removed.
    pub async fn delete<'e, E>(exec: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM identifications WHERE id = $1")
            .bind(id)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
