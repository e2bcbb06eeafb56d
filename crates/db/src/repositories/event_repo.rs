//! Repository for the `events` table.

use ambi_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::event::{Event, EventWithCounts};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, group_by, start_at, end_at, deployment_id, project_id, created_at, updated_at";

/// Provides read/write operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Fetch the event for (deployment, group_by), creating it if missing.
    ///
    /// `start`/`end` are defaults applied only on creation; an existing
    /// event keeps its boundaries until [`EventRepo::refresh_boundaries`]
    /// recomputes them from member captures.
    pub async fn get_or_create(
        pool: &PgPool,
        deployment_id: DbId,
        group_by: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Event, sqlx::Error> {
        // The no-op DO UPDATE makes RETURNING yield the existing row on
        // conflict without touching its boundaries.
        let query = format!(
            "INSERT INTO events (deployment_id, group_by, start_at, end_at, project_id)
             VALUES ($1, $2, $3, $4, (SELECT project_id FROM deployments WHERE id = $1))
             ON CONFLICT ON CONSTRAINT uq_events_deployment_group_by
             DO UPDATE SET group_by = EXCLUDED.group_by
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(deployment_id)
            .bind(group_by)
            .bind(start)
            .bind(end)
            .fetch_one(pool)
            .await
    }

    /// Find an event by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all events for a deployment ordered by start time.
    pub async fn list_by_deployment(
        pool: &PgPool,
        deployment_id: DbId,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM events WHERE deployment_id = $1 ORDER BY start_at");
        sqlx::query_as::<_, Event>(&query)
            .bind(deployment_id)
            .fetch_all(pool)
            .await
    }

    /// List events with capture/occurrence counts for a deployment.
    pub async fn list_with_counts(
        pool: &PgPool,
        deployment_id: DbId,
    ) -> Result<Vec<EventWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT e.{columns},
                (SELECT COUNT(*) FROM captures c WHERE c.event_id = e.id) AS captures_count,
                (SELECT COUNT(*) FROM occurrences o WHERE o.event_id = e.id) AS occurrences_count
             FROM events e
             WHERE e.deployment_id = $1
             ORDER BY e.start_at",
            columns = COLUMNS.replace(", ", ", e."),
        );
        sqlx::query_as::<_, EventWithCounts>(&query)
            .bind(deployment_id)
            .fetch_all(pool)
            .await
    }

    /// Recompute `start_at`/`end_at` from the event's actual member captures.
    ///
    /// Events without any timestamped captures are left untouched (they are
    /// candidates for [`EventRepo::delete_empty`]).
    pub async fn refresh_boundaries(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE events SET start_at = sub.first, end_at = sub.last
             FROM (
                SELECT MIN(timestamp) AS first, MAX(timestamp) AS last
                FROM captures WHERE event_id = $1
             ) AS sub
             WHERE id = $1 AND sub.first IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete events with zero captures and zero occurrences.
    ///
    /// Scoped to one deployment when `deployment_id` is given, global
    /// otherwise (caller policy). Returns the number of events removed.
    pub async fn delete_empty(
        pool: &PgPool,
        deployment_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM events e
             WHERE ($1::BIGINT IS NULL OR e.deployment_id = $1)
               AND NOT EXISTS (SELECT 1 FROM captures c WHERE c.event_id = e.id)
               AND NOT EXISTS (SELECT 1 FROM occurrences o WHERE o.event_id = e.id)",
        )
        .bind(deployment_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete an event by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
