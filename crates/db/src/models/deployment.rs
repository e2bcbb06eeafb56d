//! Deployment entity model (a camera installation capturing images over time).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `deployments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deployment {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub project_id: DbId,
    pub data_source_id: Option<DbId>,
    pub data_source_subdir: Option<String>,
    pub data_source_regex: Option<String>,
    /// Cached capture count, refreshed by the sync pipeline.
    pub data_source_total_files: Option<i64>,
    /// Cached total byte size, refreshed by the sync pipeline.
    pub data_source_total_size: Option<i64>,
    pub data_source_last_checked: Option<Timestamp>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeployment {
    pub name: String,
    pub description: Option<String>,
    pub project_id: DbId,
    pub data_source_id: Option<DbId>,
    pub data_source_subdir: Option<String>,
    pub data_source_regex: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// DTO for updating an existing deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDeployment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub data_source_id: Option<DbId>,
    pub data_source_subdir: Option<String>,
    pub data_source_regex: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
