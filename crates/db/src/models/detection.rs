//! Detection entity model (one localized subject within one capture).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `detections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Detection {
    pub id: DbId,
    pub capture_id: DbId,
    /// Detections can exist without an occurrence; the tracking process
    /// links them later.
    pub occurrence_id: Option<DbId>,
    pub timestamp: Option<Timestamp>,
    pub bbox_x: f64,
    pub bbox_y: f64,
    pub bbox_width: f64,
    pub bbox_height: f64,
    pub crop_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new detection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDetection {
    pub capture_id: DbId,
    pub occurrence_id: Option<DbId>,
    pub timestamp: Option<Timestamp>,
    pub bbox_x: f64,
    pub bbox_y: f64,
    pub bbox_width: f64,
    pub bbox_height: f64,
    pub crop_path: Option<String>,
}
