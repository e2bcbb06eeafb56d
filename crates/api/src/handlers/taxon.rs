//! Handlers for the `/taxa` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::taxon::{CreateTaxon, Taxon};
use ambi_db::repositories::TaxonRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetParentInput {
    /// `null` detaches the taxon, making it a root.
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveInput {
    pub active: bool,
}

/// POST /api/v1/taxa
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTaxon>,
) -> AppResult<(StatusCode, Json<Taxon>)> {
    let taxon = TaxonRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(taxon)))
}

/// GET /api/v1/taxa/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Taxon>> {
    let taxon = TaxonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "taxon", id }))?;
    Ok(Json(taxon))
}

/// GET /api/v1/taxa/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Taxon>>> {
    TaxonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "taxon", id }))?;
    Ok(Json(TaxonRepo::list_children(&state.pool, id).await?))
}

/// PUT /api/v1/taxa/{id}/parent
///
/// Rejects moves that would close a cycle with 409.
pub async fn set_parent(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetParentInput>,
) -> AppResult<Json<Taxon>> {
    let taxon = TaxonRepo::set_parent(&state.pool, id, input.parent_id).await?;
    Ok(Json(taxon))
}

/// PUT /api/v1/taxa/{id}/active
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetActiveInput>,
) -> AppResult<StatusCode> {
    if TaxonRepo::set_active(&state.pool, id, input.active).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "taxon", id }))
    }
}
