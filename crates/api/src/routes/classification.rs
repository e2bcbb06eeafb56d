//! Route definitions for the `/classifications` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::classification;
use crate::state::AppState;

/// Routes mounted at `/classifications`.
///
/// ```text
/// POST   /   -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(classification::create))
}
