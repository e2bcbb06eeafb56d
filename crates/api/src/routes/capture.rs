//! Route definitions for the `/captures` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::capture;
use crate::state::AppState;

/// Routes mounted at `/captures`.
///
/// ```text
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(capture::create))
        .route("/{id}", get(capture::get_by_id).delete(capture::delete))
}
