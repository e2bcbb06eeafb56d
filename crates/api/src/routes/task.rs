//! Route definitions for the `/tasks` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /{id}   -> get_by_id (poll background task status)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(task::get_by_id))
}
