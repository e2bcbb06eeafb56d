//! The determination state machine for occurrences.
//!
//! An occurrence's determination is its currently accepted taxon. The
//! resolution order is fixed: the latest non-withdrawn human identification
//! wins outright; with none present, the best machine prediction (each
//! algorithm's top score, highest overall, most recent on an exact tie)
//! decides. Every write that can change the outcome runs the resolver
//! inside the same transaction.

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use sqlx::{Postgres, Transaction};
use tracing::info;

use ambi_db::models::identification::{CreateIdentification, Identification};
use ambi_db::repositories::{IdentificationRepo, OccurrenceRepo};
use ambi_db::DbPool;

use crate::error::PipelineError;

/// Recompute and store the occurrence's determination.
///
/// Returns the winning taxon, if any. Clears the cached determination when
/// neither identifications nor predictions name a taxon. The row is only
/// written (and the change logged) when the outcome differs from the stored
/// value, so redundant resolves are true no-ops.
pub async fn resolve_determination(
    tx: &mut Transaction<'_, Postgres>,
    occurrence_id: DbId,
) -> Result<Option<DbId>, PipelineError> {
    let taxon_id = match OccurrenceRepo::best_identification(&mut **tx, occurrence_id).await? {
        Some(identification) => identification.taxon_id,
        None => OccurrenceRepo::best_prediction(&mut **tx, occurrence_id)
            .await?
            .map(|p| p.taxon_id),
    };
    let changed = OccurrenceRepo::set_determination(&mut **tx, occurrence_id, taxon_id).await?;
    if changed {
        info!(occurrence_id, determination = ?taxon_id, "determination changed");
    }
    Ok(taxon_id)
}

/// Submit a human identification.
///
/// Atomically inserts the row, withdraws the user's other active
/// identifications on the occurrence, and re-resolves the determination.
/// An identification submitted pre-withdrawn skips the withdraw step and
/// never outranks active ones.
pub async fn create_identification(
    pool: &DbPool,
    input: &CreateIdentification,
) -> Result<Identification, PipelineError> {
    let mut tx = pool.begin().await?;

    OccurrenceRepo::find_by_id(&mut *tx, input.occurrence_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "occurrence",
            id: input.occurrence_id,
        })?;

    let identification = IdentificationRepo::insert(&mut *tx, input).await?;
    if !input.withdrawn {
        IdentificationRepo::withdraw_others(
            &mut *tx,
            input.occurrence_id,
            input.user_id,
            identification.id,
        )
        .await?;
    }
    let determination = resolve_determination(&mut tx, input.occurrence_id).await?;

    tx.commit().await?;
    info!(
        occurrence_id = input.occurrence_id,
        identification_id = identification.id,
        determination = ?determination,
        "created identification"
    );
    Ok(identification)
}

/// Delete an identification and repair the occurrence's state.
///
/// If the deleted row was active, the same user's most recently withdrawn
/// identification is restored, so deleting a revised opinion falls back to
/// the previous one. The determination is re-resolved either way.
pub async fn delete_identification(pool: &DbPool, id: DbId) -> Result<(), PipelineError> {
    let mut tx = pool.begin().await?;

    let identification = IdentificationRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "identification",
            id,
        })?;
    IdentificationRepo::delete(&mut *tx, id).await?;

    if !identification.withdrawn {
        if let Some(previous) = IdentificationRepo::most_recent_withdrawn(
            &mut *tx,
            identification.occurrence_id,
            identification.user_id,
        )
        .await?
        {
            IdentificationRepo::set_withdrawn(&mut *tx, previous.id, false).await?;
        }
    }
    let determination = resolve_determination(&mut tx, identification.occurrence_id).await?;

    tx.commit().await?;
    info!(
        occurrence_id = identification.occurrence_id,
        identification_id = id,
        determination = ?determination,
        "deleted identification"
    );
    Ok(())
}

/// Re-resolve an occurrence's determination outside any other write.
///
/// Used after machine classifications arrive for its detections.
pub async fn update_occurrence_determination(
    pool: &DbPool,
    occurrence_id: DbId,
) -> Result<Option<DbId>, PipelineError> {
    let mut tx = pool.begin().await?;
    OccurrenceRepo::find_by_id(&mut *tx, occurrence_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "occurrence",
            id: occurrence_id,
        })?;
    let determination = resolve_determination(&mut tx, occurrence_id).await?;
    tx.commit().await?;
    Ok(determination)
}
