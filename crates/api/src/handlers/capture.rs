//! Handlers for the `/captures` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::capture::{Capture, CreateCapture};
use ambi_db::repositories::CaptureRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Capture row enriched with its resolved public URL.
#[derive(Debug, Serialize)]
pub struct CaptureDetail {
    #[serde(flatten)]
    pub capture: Capture,
    pub public_url: String,
}

impl From<Capture> for CaptureDetail {
    fn from(capture: Capture) -> Self {
        let public_url = capture.public_url();
        Self {
            capture,
            public_url,
        }
    }
}

/// POST /api/v1/captures
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCapture>,
) -> AppResult<(StatusCode, Json<CaptureDetail>)> {
    let capture = CaptureRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(capture.into())))
}

/// GET /api/v1/captures/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CaptureDetail>> {
    let capture = CaptureRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "capture",
            id,
        }))?;
    Ok(Json(capture.into()))
}

/// DELETE /api/v1/captures/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if CaptureRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "capture",
            id,
        }))
    }
}
