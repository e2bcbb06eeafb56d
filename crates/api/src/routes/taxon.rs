//! Route definitions for the `/taxa` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::taxon;
use crate::state::AppState;

/// Routes mounted at `/taxa`.
///
/// ```text
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// GET    /{id}/children    -> list_children
/// PUT    /{id}/parent      -> set_parent (409 on cycle)
/// PUT    /{id}/active      -> set_active
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(taxon::create))
        .route("/{id}", get(taxon::get_by_id))
        .route("/{id}/children", get(taxon::list_children))
        .route("/{id}/parent", put(taxon::set_parent))
        .route("/{id}/active", put(taxon::set_active))
}
