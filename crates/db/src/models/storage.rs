//! Storage-source entity model (per-deployment object store configuration).

use ambi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `storage_sources` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StorageSource {
    pub id: DbId,
    pub name: String,
    pub bucket: String,
    pub prefix: String,
    pub endpoint_url: Option<String>,
    pub public_base_url: String,
    pub total_files: Option<i64>,
    pub total_size: Option<i64>,
    pub last_checked: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StorageSource {
    /// The `s3://bucket/prefix[/path]` URI for a path under this source.
    pub fn uri(&self, path: Option<&str>) -> String {
        let full_path = [Some(self.bucket.as_str()), Some(self.prefix.as_str()), path]
            .into_iter()
            .flatten()
            .map(|part| part.trim_matches('/'))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        format!("s3://{full_path}")
    }
}

/// DTO for creating a new storage source.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStorageSource {
    pub name: String,
    pub bucket: String,
    pub prefix: Option<String>,
    pub endpoint_url: Option<String>,
    pub public_base_url: Option<String>,
}

/// DTO for updating an existing storage source.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStorageSource {
    pub name: Option<String>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub endpoint_url: Option<String>,
    pub public_base_url: Option<String>,
}
