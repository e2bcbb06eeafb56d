//! S3-backed object store lister.
//!
//! Implements the pipeline's [`ObjectStoreLister`] seam against real
//! buckets. Sources can override the endpoint URL, which is how MinIO and
//! other S3-compatible stores are reached.

use ambi_core::error::CoreError;
use ambi_db::models::storage::StorageSource;
use ambi_pipeline::sync::{ObjectStoreLister, RemoteObject};
use ambi_pipeline::PipelineError;
use async_trait::async_trait;
use aws_sdk_s3::Client;

pub struct S3Lister {
    base_config: aws_config::SdkConfig,
}

impl S3Lister {
    /// Build a lister from the ambient AWS environment (credentials chain,
    /// region, etc.).
    pub async fn from_env() -> Self {
        let base_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self { base_config }
    }

    fn client_for(&self, source: &StorageSource) -> Client {
        match source.endpoint_url.as_deref() {
            Some(endpoint) => {
                // Path-style addressing; S3-compatible stores rarely support
                // virtual-hosted buckets.
                let config = aws_sdk_s3::config::Builder::from(&self.base_config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                Client::from_conf(config)
            }
            None => Client::new(&self.base_config),
        }
    }
}

/// Join the source prefix and optional subdir into one listing prefix.
fn listing_prefix(source: &StorageSource, subdir: Option<&str>) -> Option<String> {
    let joined = [Some(source.prefix.as_str()), subdir]
        .into_iter()
        .flatten()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        None
    } else {
        Some(format!("{joined}/"))
    }
}

#[async_trait]
impl ObjectStoreLister for S3Lister {
    async fn list_objects(
        &self,
        source: &StorageSource,
        subdir: Option<&str>,
    ) -> Result<Vec<RemoteObject>, PipelineError> {
        let client = self.client_for(source);
        let prefix = listing_prefix(source, subdir);

        let mut pages = client
            .list_objects_v2()
            .bucket(&source.bucket)
            .set_prefix(prefix.clone())
            .into_paginator()
            .send();

        let strip = prefix.as_deref().unwrap_or("");
        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                CoreError::Internal(format!(
                    "listing s3://{}/{} failed: {e}",
                    source.bucket, source.prefix
                ))
            })?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                // Keys are stored relative to the source prefix.
                let relative = key.strip_prefix(strip).unwrap_or(key);
                if relative.is_empty() || relative.ends_with('/') {
                    continue;
                }
                objects.push(RemoteObject {
                    key: relative.to_string(),
                    size: object.size(),
                    last_modified: object
                        .last_modified()
                        .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                    checksum: object.e_tag().map(|t| t.trim_matches('"').to_string()),
                    checksum_algorithm: object.e_tag().map(|_| "md5".to_string()),
                });
            }
        }
        Ok(objects)
    }
}
