//! Route definition for the root-level health check.

use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Routes mounted at `/` (outside the `/api/v1` prefix).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}
