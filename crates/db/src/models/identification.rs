//! Identification entity model (a human taxon assignment for an occurrence).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `identifications` table.
///
/// At most one identification per (occurrence, user) is active (not
/// withdrawn) at a time. The invariant is enforced by the determination
/// pipeline's withdraw-then-create transition, not by the schema.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Identification {
    pub id: DbId,
    pub occurrence_id: DbId,
    pub user_id: Option<DbId>,
    pub taxon_id: Option<DbId>,
    pub withdrawn: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting an identification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIdentification {
    pub occurrence_id: DbId,
    pub user_id: Option<DbId>,
    pub taxon_id: Option<DbId>,
    /// Explicitly-withdrawn identifications skip the withdraw-others step.
    #[serde(default)]
    pub withdrawn: bool,
}
