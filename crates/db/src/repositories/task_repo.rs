//! Repository for the `task_queue` table.
//!
//! Dispatch is by (task name, entity id). Claiming uses
//! `FOR UPDATE SKIP LOCKED` so multiple workers can poll the same queue
//! without stepping on each other. Execution is at-least-once.

use ambi_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::Task;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_name, entity_id, status, attempts, error, created_at, updated_at";

/// Provides queueing operations for background tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Enqueue a task unless an identical pending one already exists.
    pub async fn enqueue(
        pool: &PgPool,
        task_name: &str,
        entity_id: DbId,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_queue (task_name, entity_id)
             SELECT $1, $2
             WHERE NOT EXISTS (
                SELECT 1 FROM task_queue
                WHERE task_name = $1 AND entity_id = $2 AND status = 'pending'
             )
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Task>(&query)
            .bind(task_name)
            .bind(entity_id)
            .fetch_optional(pool)
            .await?;
        match inserted {
            Some(task) => Ok(task),
            // Deduplicated; hand back the pending row.
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM task_queue
                     WHERE task_name = $1 AND entity_id = $2 AND status = 'pending'
                     ORDER BY id
                     LIMIT 1"
                );
                sqlx::query_as::<_, Task>(&query)
                    .bind(task_name)
                    .bind(entity_id)
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Claim the oldest pending task, marking it running.
    ///
    /// `SKIP LOCKED` lets concurrent workers each claim a different row.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE task_queue SET status = 'running', attempts = attempts + 1
             WHERE id = (
                SELECT id FROM task_queue
                WHERE status = 'pending'
                ORDER BY id
                FOR UPDATE SKIP LOCKED
                LIMIT 1
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query).fetch_optional(pool).await
    }

    /// Mark a claimed task finished.
    pub async fn mark_done(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE task_queue SET status = 'done', error = NULL WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a failure. The task goes back to pending until `max_attempts`
    /// is exhausted, then sticks as failed.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        error: &str,
        max_attempts: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE task_queue
             SET status = CASE WHEN attempts >= $3 THEN 'failed' ELSE 'pending' END,
                 error = $2
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(max_attempts)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a task by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_queue WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Remove finished tasks older than the given number of days.
    pub async fn prune_done(pool: &PgPool, older_than_days: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM task_queue
             WHERE status = 'done'
               AND updated_at < NOW() - make_interval(days => $1)",
        )
        .bind(older_than_days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
