//! Handlers for the `/collections` resource.
//!
//! Population runs the collection's stored sampling strategy; it can scan
//! every capture in the project, so the endpoint enqueues a background task.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::collection::{
    CaptureCollection, CreateCaptureCollection, UpdateCaptureCollection,
};
use ambi_db::models::task::{Task, TASK_POPULATE_COLLECTION};
use ambi_db::repositories::{CollectionRepo, TaskRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Collection row enriched with its current member count.
#[derive(Debug, Serialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: CaptureCollection,
    pub capture_count: i64,
}

async fn require_collection(state: &AppState, id: DbId) -> AppResult<CaptureCollection> {
    CollectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "collection",
            id,
        }))
}

/// POST /api/v1/collections
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCaptureCollection>,
) -> AppResult<(StatusCode, Json<CaptureCollection>)> {
    let collection = CollectionRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// GET /api/v1/projects/{project_id}/collections
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<CaptureCollection>>> {
    Ok(Json(
        CollectionRepo::list_by_project(&state.pool, project_id).await?,
    ))
}

/// GET /api/v1/collections/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CollectionDetail>> {
    let collection = require_collection(&state, id).await?;
    let capture_count = CollectionRepo::capture_count(&state.pool, id).await?;
    Ok(Json(CollectionDetail {
        collection,
        capture_count,
    }))
}

/// PUT /api/v1/collections/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCaptureCollection>,
) -> AppResult<Json<CaptureCollection>> {
    let collection = CollectionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "collection",
            id,
        }))?;
    Ok(Json(collection))
}

/// DELETE /api/v1/collections/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if CollectionRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "collection",
            id,
        }))
    }
}

/// GET /api/v1/collections/{id}/captures
pub async fn list_captures(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<DbId>>> {
    require_collection(&state, id).await?;
    Ok(Json(CollectionRepo::capture_ids(&state.pool, id).await?))
}

/// POST /api/v1/collections/{id}/populate
pub async fn populate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<Task>)> {
    require_collection(&state, id).await?;
    let task = TaskRepo::enqueue(&state.pool, TASK_POPULATE_COLLECTION, id).await?;
    Ok((StatusCode::ACCEPTED, Json(task)))
}
