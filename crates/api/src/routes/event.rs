//! Route definitions for the `/events` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::event;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /{id}                        -> get_by_id
/// DELETE /{id}                        -> delete
/// GET    /{id}/captures               -> list_captures
/// POST   /{id}/backfill-dimensions    -> backfill_dimensions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(event::get_by_id).delete(event::delete))
        .route("/{id}/captures", get(event::list_captures))
        .route(
            "/{id}/backfill-dimensions",
            post(event::backfill_dimensions),
        )
}
