//! Event entity model (a derived monitoring session).

use ambi_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table.
///
/// An event is a maximal run of captures from one deployment whose
/// consecutive timestamps differ by less than the grouping gap. `group_by`
/// is the stable identity within a deployment (the session's start date by
/// default) so captures can be prepended or appended to an existing event
/// on regrouping; `start_at`/`end_at` are derived from member captures.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub group_by: String,
    pub start_at: Timestamp,
    pub end_at: Option<Timestamp>,
    pub deployment_id: DbId,
    pub project_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An event with capture/occurrence counts, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventWithCounts {
    pub id: DbId,
    pub group_by: String,
    pub start_at: Timestamp,
    pub end_at: Option<Timestamp>,
    pub deployment_id: DbId,
    pub project_id: Option<DbId>,
    pub captures_count: i64,
    pub occurrences_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
