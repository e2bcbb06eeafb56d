pub mod algorithm;
pub mod capture;
pub mod classification;
pub mod collection;
pub mod deployment;
pub mod detection;
pub mod event;
pub mod health;
pub mod identification;
pub mod occurrence;
pub mod project;
pub mod storage;
pub mod task;
pub mod taxon;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                  list, create
/// /projects/{id}                             get, update, delete
/// /projects/{project_id}/deployments         list
/// /projects/{project_id}/collections         list
///
/// /deployments                               create
/// /deployments/{id}                          get, update, delete
/// /deployments/{id}/events                   list events with counts
/// /deployments/{id}/captures                 list captures (?limit, offset)
/// /deployments/{id}/sync                     enqueue capture sync (POST, 202)
/// /deployments/{id}/regroup                  enqueue event regroup (POST, 202)
///
/// /storage-sources                           list, create
/// /storage-sources/{id}                      get, update, delete
///
/// /events/{id}                               get, delete
/// /events/{id}/captures                      list member captures
/// /events/{id}/backfill-dimensions           copy dimensions across event (POST)
///
/// /captures                                  create
/// /captures/{id}                             get, delete
///
/// /occurrences                               create
/// /occurrences/{id}                          get (with determination score), delete
/// /occurrences/{id}/identifications          list
/// /occurrences/{id}/resolve                  re-resolve determination (POST)
///
/// /identifications                           create (withdraws user's others)
/// /identifications/{id}                      delete (restores previous)
///
/// /detections                                create
/// /detections/{id}                           get
/// /detections/{id}/classifications           list, best score first
///
/// /classifications                           create (re-resolves occurrence)
///
/// /algorithms                                list, register (idempotent)
/// /algorithms/{id}                           get
///
/// /taxa                                      create
/// /taxa/{id}                                 get
/// /taxa/{id}/children                        list direct children
/// /taxa/{id}/parent                          re-parent, cycle-checked (PUT)
/// /taxa/{id}/active                          activate/deactivate (PUT)
///
/// /collections                               create
/// /collections/{id}                          get (with count), update, delete
/// /collections/{id}/captures                 member capture IDs
/// /collections/{id}/populate                 enqueue sampling run (POST, 202)
///
/// /users                                     create
/// /users/{id}                                get
///
/// /tasks/{id}                                get (poll background task status)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Project routes (also nest deployment and collection listings).
        .nest("/projects", project::router())
        .nest("/deployments", deployment::router())
        .nest("/storage-sources", storage::router())
        // Events are derived; read, delete, and backfill only.
        .nest("/events", event::router())
        .nest("/captures", capture::router())
        // Occurrence determination surface.
        .nest("/occurrences", occurrence::router())
        .nest("/identifications", identification::router())
        .nest("/detections", detection::router())
        .nest("/classifications", classification::router())
        .nest("/algorithms", algorithm::router())
        // Taxonomic tree.
        .nest("/taxa", taxon::router())
        // Capture collections and sampling.
        .nest("/collections", collection::router())
        .nest("/users", user::router())
        .nest("/tasks", task::router())
}
