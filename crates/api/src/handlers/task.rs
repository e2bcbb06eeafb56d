//! Handlers for the `/tasks` resource (background task status).

use axum::extract::{Path, State};
use axum::Json;
use ambi_core::error::CoreError;
use ambi_core::types::DbId;
use ambi_db::models::task::Task;
use ambi_db::repositories::TaskRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "task", id }))?;
    Ok(Json(task))
}
