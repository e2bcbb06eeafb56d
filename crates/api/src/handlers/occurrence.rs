//! Handlers for the `/occurrences` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::identification::Identification;
use ambi_db::models::occurrence::{CreateOccurrence, Occurrence};
use ambi_db::repositories::{IdentificationRepo, OccurrenceRepo};
use ambi_pipeline::determination::update_occurrence_determination;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Occurrence row enriched with the score behind its determination.
#[derive(Debug, Serialize)]
pub struct OccurrenceDetail {
    #[serde(flatten)]
    pub occurrence: Occurrence,
    /// Present when the determination came from a machine prediction.
    pub determination_score: Option<f64>,
}

/// POST /api/v1/occurrences
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateOccurrence>,
) -> AppResult<(StatusCode, Json<Occurrence>)> {
    let occurrence = OccurrenceRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(occurrence)))
}

/// GET /api/v1/occurrences/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<OccurrenceDetail>> {
    let occurrence = OccurrenceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "occurrence",
            id,
        }))?;
    let determination_score = OccurrenceRepo::determination_score(&state.pool, id).await?;
    Ok(Json(OccurrenceDetail {
        occurrence,
        determination_score,
    }))
}

/// GET /api/v1/occurrences/{id}/identifications
pub async fn list_identifications(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Identification>>> {
    OccurrenceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "occurrence",
            id,
        }))?;
    Ok(Json(
        IdentificationRepo::list_by_occurrence(&state.pool, id).await?,
    ))
}

/// POST /api/v1/occurrences/{id}/resolve
///
/// Forces a determination re-resolution, e.g. after classifications were
/// imported out of band.
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let determination = update_occurrence_determination(&state.pool, id).await?;
    Ok(Json(json!({ "determination_id": determination })))
}

/// DELETE /api/v1/occurrences/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if OccurrenceRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "occurrence",
            id,
        }))
    }
}
