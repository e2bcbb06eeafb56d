//! Route definitions for the `/collections` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::collection;
use crate::state::AppState;

/// Routes mounted at `/collections`.
///
/// ```text
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id (with member count)
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// GET    /{id}/captures     -> list_captures (member IDs)
/// POST   /{id}/populate     -> populate (202)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(collection::create))
        .route(
            "/{id}",
            get(collection::get_by_id)
                .put(collection::update)
                .delete(collection::delete),
        )
        .route("/{id}/captures", get(collection::list_captures))
        .route("/{id}/populate", post(collection::populate))
}
