//! Route definitions for the `/deployments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::deployment;
use crate::state::AppState;

/// Routes mounted at `/deployments`.
///
/// ```text
/// POST   /                     -> create
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
/// GET    /{id}/events          -> list_events
/// GET    /{id}/captures        -> list_captures (?limit, offset)
/// POST   /{id}/sync            -> sync (202)
/// POST   /{id}/regroup         -> regroup (202)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(deployment::create))
        .route(
            "/{id}",
            get(deployment::get_by_id)
                .put(deployment::update)
                .delete(deployment::delete),
        )
        .route("/{id}/events", get(deployment::list_events))
        .route("/{id}/captures", get(deployment::list_captures))
        .route("/{id}/sync", post(deployment::sync))
        .route("/{id}/regroup", post(deployment::regroup))
}
