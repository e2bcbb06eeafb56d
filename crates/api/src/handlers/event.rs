//! Handlers for the `/events` resource.
//!
//! Events are derived rows; the API only reads them, deletes them, and
//! triggers dimension backfill.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::capture::Capture;
use ambi_db::models::event::Event;
use ambi_db::repositories::{CaptureRepo, EventRepo};
use ambi_pipeline::maintenance::backfill_event_dimensions;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BackfillDimensionsInput {
    #[serde(default)]
    pub replace_existing: bool,
}

/// GET /api/v1/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "event",
            id,
        }))?;
    Ok(Json(event))
}

/// GET /api/v1/events/{id}/captures
pub async fn list_captures(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Capture>>> {
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "event",
            id,
        }))?;
    Ok(Json(CaptureRepo::list_by_event(&state.pool, id).await?))
}

/// POST /api/v1/events/{id}/backfill-dimensions
pub async fn backfill_dimensions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<BackfillDimensionsInput>,
) -> AppResult<Json<serde_json::Value>> {
    let updated = backfill_event_dimensions(&state.pool, id, input.replace_existing).await?;
    Ok(Json(json!({ "updated": updated })))
}

/// DELETE /api/v1/events/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if EventRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "event",
            id,
        }))
    }
}
