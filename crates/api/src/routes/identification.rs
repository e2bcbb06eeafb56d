//! Route definitions for the `/identifications` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::identification;
use crate::state::AppState;

/// Routes mounted at `/identifications`.
///
/// ```text
/// POST   /       -> create
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(identification::create))
        .route("/{id}", delete(identification::delete))
}
