//! Classification and algorithm entity models.
//!
//! Classifications are machine predictions produced by external models; the
//! core only consumes them when resolving occurrence determinations.

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `algorithms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Algorithm {
    pub id: DbId,
    pub name: String,
    pub version: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `classifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Classification {
    pub id: DbId,
    pub detection_id: DbId,
    pub taxon_id: Option<DbId>,
    pub algorithm_id: Option<DbId>,
    /// Softmax probability; comparisons are strict (`>`), so on an exact tie
    /// the more recently created classification wins via secondary ordering.
    pub score: Option<f64>,
    pub timestamp: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for registering a machine classification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassification {
    pub detection_id: DbId,
    pub taxon_id: Option<DbId>,
    pub algorithm_id: Option<DbId>,
    pub score: Option<f64>,
    pub timestamp: Option<Timestamp>,
}
