//! Capture entity model (a single source image from a monitoring session).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `captures` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Capture {
    pub id: DbId,
    pub path: String,
    pub public_base_url: String,
    /// Null until extracted from the filename; null-timestamp captures are
    /// excluded from event grouping.
    pub timestamp: Option<Timestamp>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub size: Option<i64>,
    pub last_modified: Option<Timestamp>,
    pub checksum: Option<String>,
    pub checksum_algorithm: Option<String>,
    /// Cached count, refreshed by the maintenance pipeline.
    pub detections_count: Option<i64>,
    pub deployment_id: DbId,
    pub project_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Capture {
    /// Public URL of the image: cached base URL joined with the object path.
    pub fn public_url(&self) -> String {
        let base = if self.public_base_url.is_empty() {
            "/"
        } else {
            &self.public_base_url
        };
        format!("{}/{}", base.trim_end_matches('/'), self.path.trim_start_matches('/'))
    }
}

/// DTO for manually registering a capture (sync uses the upsert path).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCapture {
    pub deployment_id: DbId,
    pub path: String,
    pub timestamp: Option<Timestamp>,
    pub size: Option<i64>,
    pub checksum: Option<String>,
    pub checksum_algorithm: Option<String>,
}

/// Flat row used by the sync pipeline's batched upsert.
#[derive(Debug, Clone)]
pub struct CaptureUpsert {
    pub path: String,
    pub public_base_url: String,
    pub timestamp: Option<Timestamp>,
    pub size: Option<i64>,
    pub last_modified: Option<Timestamp>,
    pub checksum: Option<String>,
    pub checksum_algorithm: Option<String>,
}
