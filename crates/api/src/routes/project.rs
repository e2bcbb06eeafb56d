//! Route definitions for the `/projects` resource.
//!
//! Also nests deployment and collection listings under
//! `/projects/{project_id}/...`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{collection, deployment, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                            -> list
/// POST   /                            -> create
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> delete
///
/// GET    /{project_id}/deployments    -> list_by_project
/// GET    /{project_id}/collections    -> list_by_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route(
            "/{project_id}/deployments",
            get(deployment::list_by_project),
        )
        .route(
            "/{project_id}/collections",
            get(collection::list_by_project),
        )
}
