//! Route definitions for the `/detections` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::detection;
use crate::state::AppState;

/// Routes mounted at `/detections`.
///
/// ```text
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// GET    /{id}/classifications    -> list_classifications
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(detection::create))
        .route("/{id}", get(detection::get_by_id))
        .route("/{id}/classifications", get(detection::list_classifications))
}
