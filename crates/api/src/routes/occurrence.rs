//! Route definitions for the `/occurrences` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::occurrence;
use crate::state::AppState;

/// Routes mounted at `/occurrences`.
///
/// ```text
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// DELETE /{id}                    -> delete
/// GET    /{id}/identifications    -> list_identifications
/// POST   /{id}/resolve            -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(occurrence::create))
        .route(
            "/{id}",
            get(occurrence::get_by_id).delete(occurrence::delete),
        )
        .route(
            "/{id}/identifications",
            get(occurrence::list_identifications),
        )
        .route("/{id}/resolve", post(occurrence::resolve))
}
