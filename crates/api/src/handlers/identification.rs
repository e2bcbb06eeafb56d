//! Handlers for the `/identifications` resource.
//!
//! Creation and deletion go through the determination pipeline so the
//! occurrence's cached determination always matches its identifications.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use ambi_core::types::DbId;
use ambi_db::models::identification::{CreateIdentification, Identification};
use ambi_pipeline::determination;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/identifications
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateIdentification>,
) -> AppResult<(StatusCode, Json<Identification>)> {
    let identification = determination::create_identification(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(identification)))
}

/// DELETE /api/v1/identifications/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    determination::delete_identification(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
