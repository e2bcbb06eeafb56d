//! Route definitions for the `/algorithms` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::classification;
use crate::state::AppState;

/// Routes mounted at `/algorithms`.
///
/// ```text
/// GET    /       -> list_algorithms
/// POST   /       -> register_algorithm (idempotent on name + version)
/// GET    /{id}   -> get_algorithm
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(classification::list_algorithms).post(classification::register_algorithm),
        )
        .route("/{id}", get(classification::get_algorithm))
}
