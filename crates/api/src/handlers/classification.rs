//! Handlers for the `/classifications` and `/algorithms` resources.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::classification::{Algorithm, Classification, CreateClassification};
use ambi_db::repositories::{AlgorithmRepo, ClassificationRepo, DetectionRepo};
use ambi_pipeline::determination::update_occurrence_determination;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterAlgorithm {
    pub name: String,
    pub version: String,
}

/// POST /api/v1/classifications
///
/// When the detection belongs to an occurrence, the occurrence's
/// determination is re-resolved so a strong new prediction takes effect
/// immediately.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateClassification>,
) -> AppResult<(StatusCode, Json<Classification>)> {
    let detection = DetectionRepo::find_by_id(&state.pool, input.detection_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "detection",
            id: input.detection_id,
        }))?;

    let classification = ClassificationRepo::create(&state.pool, &input).await?;
    if let Some(occurrence_id) = detection.occurrence_id {
        update_occurrence_determination(&state.pool, occurrence_id).await?;
    }
    Ok((StatusCode::CREATED, Json(classification)))
}

/// POST /api/v1/algorithms
///
/// Idempotent on (name, version); re-registering returns the existing row.
pub async fn register_algorithm(
    State(state): State<AppState>,
    Json(input): Json<RegisterAlgorithm>,
) -> AppResult<Json<Algorithm>> {
    let algorithm = AlgorithmRepo::get_or_create(&state.pool, &input.name, &input.version).await?;
    Ok(Json(algorithm))
}

/// GET /api/v1/algorithms
pub async fn list_algorithms(State(state): State<AppState>) -> AppResult<Json<Vec<Algorithm>>> {
    Ok(Json(AlgorithmRepo::list(&state.pool).await?))
}

/// GET /api/v1/algorithms/{id}
pub async fn get_algorithm(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Algorithm>> {
    let algorithm = AlgorithmRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "algorithm",
            id,
        }))?;
    Ok(Json(algorithm))
}
