//! Taxon entity model (a node in the taxonomic tree).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `taxa` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Taxon {
    pub id: DbId,
    pub name: String,
    /// Cached display name, recomputed on write ("Genus sp." for genera).
    pub display_name: String,
    /// Stored rank string; parse with `ambi_core::taxonomy::TaxonRank`.
    pub rank: String,
    pub parent_id: Option<DbId>,
    /// Cached ancestor ids, root-first. Derived, never hand-edited.
    pub parents: Vec<DbId>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new taxon.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaxon {
    pub name: String,
    pub rank: String,
    pub parent_id: Option<DbId>,
}
