//! Occurrence entity model (one tracked subject across detections).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `occurrences` table.
///
/// `determination_id` caches the currently accepted taxonomic identity; it
/// must only be written through the determination resolver so it always
/// reflects the best identification or prediction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Occurrence {
    pub id: DbId,
    pub determination_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub deployment_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new occurrence (by the external tracking process).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOccurrence {
    pub event_id: Option<DbId>,
    pub deployment_id: Option<DbId>,
    pub project_id: Option<DbId>,
}
