//! Handlers for the `/detections` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::classification::Classification;
use ambi_db::models::detection::{CreateDetection, Detection};
use ambi_db::repositories::{ClassificationRepo, DetectionRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/detections
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDetection>,
) -> AppResult<(StatusCode, Json<Detection>)> {
    let detection = DetectionRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(detection)))
}

/// GET /api/v1/detections/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Detection>> {
    let detection = DetectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "detection",
            id,
        }))?;
    Ok(Json(detection))
}

/// GET /api/v1/detections/{id}/classifications
pub async fn list_classifications(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Classification>>> {
    DetectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "detection",
            id,
        }))?;
    Ok(Json(
        ClassificationRepo::list_by_detection(&state.pool, id).await?,
    ))
}
