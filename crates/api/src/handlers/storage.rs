//! Handlers for the `/storage-sources` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::storage::{CreateStorageSource, StorageSource, UpdateStorageSource};
use ambi_db::models::task::TASK_UPDATE_PUBLIC_URLS;
use ambi_db::repositories::{StorageRepo, TaskRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/storage-sources
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateStorageSource>,
) -> AppResult<(StatusCode, Json<StorageSource>)> {
    let source = StorageRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(source)))
}

/// GET /api/v1/storage-sources
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<StorageSource>>> {
    Ok(Json(StorageRepo::list(&state.pool).await?))
}

/// GET /api/v1/storage-sources/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<StorageSource>> {
    let source = StorageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "storage source",
            id,
        }))?;
    Ok(Json(source))
}

/// PUT /api/v1/storage-sources/{id}
///
/// Changing the public base URL schedules a rewrite of the cached copy on
/// every capture of the source's deployments.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStorageSource>,
) -> AppResult<Json<StorageSource>> {
    let existing = StorageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "storage source",
            id,
        }))?;

    let source = StorageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "storage source",
            id,
        }))?;

    if source.public_base_url != existing.public_base_url {
        TaskRepo::enqueue(&state.pool, TASK_UPDATE_PUBLIC_URLS, id).await?;
    }
    Ok(Json(source))
}

/// DELETE /api/v1/storage-sources/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if StorageRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "storage source",
            id,
        }))
    }
}
