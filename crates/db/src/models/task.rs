//! Task-queue entity model (background dispatch by name + primary key).

use ambi_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Task names the worker knows how to dispatch.
pub const TASK_REGROUP_EVENTS: &str = "regroup_events";
pub const TASK_SYNC_CAPTURES: &str = "sync_captures";
pub const TASK_POPULATE_COLLECTION: &str = "populate_collection";
pub const TASK_UPDATE_DETECTION_COUNTS: &str = "update_detection_counts";
pub const TASK_UPDATE_PUBLIC_URLS: &str = "update_public_urls";

/// A row from the `task_queue` table.
///
/// Execution is at-least-once: duplicate runs of any task must be harmless.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub task_name: String,
    pub entity_id: DbId,
    pub status: String,
    pub attempts: i32,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
