//! Collection population: run a stored sampling strategy and replace the
//! collection's membership with the result.

use ambi_core::error::CoreError;
use ambi_core::sampling::{self, SamplingMethod};
use ambi_core::types::DbId;
use tracing::info;

use ambi_db::repositories::{CaptureRepo, CollectionRepo};
use ambi_db::DbPool;

use crate::error::PipelineError;

/// Populate a collection from its stored method and kwargs.
///
/// The strategy only ever sees captures of the collection's own project.
/// Returns the number of captures selected.
pub async fn populate_collection(
    pool: &DbPool,
    collection_id: DbId,
) -> Result<usize, PipelineError> {
    let collection = CollectionRepo::find_by_id(pool, collection_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "collection",
            id: collection_id,
        })?;

    let method = SamplingMethod::from_parts(&collection.method, &collection.method_args)?;
    let captures = CaptureRepo::samples_for_project(pool, collection.project_id).await?;

    let mut rng = rand::rng();
    let ids = sampling::sample(&method, &captures, &mut rng);
    CollectionRepo::replace_captures(pool, collection_id, &ids).await?;

    info!(
        collection_id,
        method = %collection.method,
        candidates = captures.len(),
        selected = ids.len(),
        "populated collection"
    );
    Ok(ids.len())
}
