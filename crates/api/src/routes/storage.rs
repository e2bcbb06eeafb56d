//! Route definitions for the `/storage-sources` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::storage;
use crate::state::AppState;

/// Routes mounted at `/storage-sources`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(storage::list).post(storage::create))
        .route(
            "/{id}",
            get(storage::get_by_id)
                .put(storage::update)
                .delete(storage::delete),
        )
}
