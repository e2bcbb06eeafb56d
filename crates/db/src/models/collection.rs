//! Capture-collection entity model (a saved sample of captures for review).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `capture_collections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaptureCollection {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub project_id: DbId,
    /// One of `ambi_core::sampling::SAMPLING_METHOD_NAMES`.
    pub method: String,
    /// Arguments passed to the sampling strategy (JSON object).
    pub method_args: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new collection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCaptureCollection {
    pub name: String,
    pub description: Option<String>,
    pub project_id: DbId,
    pub method: String,
    pub method_args: Option<serde_json::Value>,
}

/// DTO for updating an existing collection.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCaptureCollection {
    pub name: Option<String>,
    pub description: Option<String>,
    pub method: Option<String>,
    pub method_args: Option<serde_json::Value>,
}
