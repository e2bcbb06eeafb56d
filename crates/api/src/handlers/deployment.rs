//! Handlers for the `/deployments` resource.
//!
//! Sync and regroup are long-running, so their endpoints enqueue a
//! background task and answer 202 with the task row.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::capture::Capture;
use ambi_db::models::deployment::{CreateDeployment, Deployment, UpdateDeployment};
use ambi_db::models::event::EventWithCounts;
use ambi_db::models::task::{Task, TASK_REGROUP_EVENTS, TASK_SYNC_CAPTURES};
use ambi_db::repositories::{CaptureRepo, DeploymentRepo, EventRepo, TaskRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CapturePageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

async fn require_deployment(state: &AppState, id: DbId) -> AppResult<Deployment> {
    DeploymentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "deployment",
            id,
        }))
}

/// POST /api/v1/deployments
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDeployment>,
) -> AppResult<(StatusCode, Json<Deployment>)> {
    let deployment = DeploymentRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(deployment)))
}

/// GET /api/v1/projects/{project_id}/deployments
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Deployment>>> {
    let deployments = DeploymentRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(deployments))
}

/// GET /api/v1/deployments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Deployment>> {
    Ok(Json(require_deployment(&state, id).await?))
}

/// PUT /api/v1/deployments/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDeployment>,
) -> AppResult<Json<Deployment>> {
    let deployment = DeploymentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "deployment",
            id,
        }))?;
    Ok(Json(deployment))
}

/// DELETE /api/v1/deployments/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if DeploymentRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "deployment",
            id,
        }))
    }
}

/// GET /api/v1/deployments/{id}/events
pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<EventWithCounts>>> {
    require_deployment(&state, id).await?;
    let events = EventRepo::list_with_counts(&state.pool, id).await?;
    Ok(Json(events))
}

/// GET /api/v1/deployments/{id}/captures
pub async fn list_captures(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(page): Query<CapturePageQuery>,
) -> AppResult<Json<Vec<Capture>>> {
    require_deployment(&state, id).await?;
    let captures =
        CaptureRepo::list_by_deployment(&state.pool, id, page.limit, page.offset).await?;
    Ok(Json(captures))
}

/// POST /api/v1/deployments/{id}/sync
pub async fn sync(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let deployment = require_deployment(&state, id).await?;
    if deployment.data_source_id.is_none() {
        return Err(AppError::Core(CoreError::Configuration(format!(
            "deployment {id} has no data source configured"
        ))));
    }
    let task = TaskRepo::enqueue(&state.pool, TASK_SYNC_CAPTURES, id).await?;
    Ok((StatusCode::ACCEPTED, Json(task)))
}

/// POST /api/v1/deployments/{id}/regroup
pub async fn regroup(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<Task>)> {
    require_deployment(&state, id).await?;
    let task = TaskRepo::enqueue(&state.pool, TASK_REGROUP_EVENTS, id).await?;
    Ok((StatusCode::ACCEPTED, Json(task)))
}
