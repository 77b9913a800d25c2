//! Route definitions for the `/cooperative/farmers` resource.
//!
//! Also nests project routes under `/{farmer_id}/projects`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{farmer, project};
use crate::state::AppState;

/// Routes mounted at `/cooperative/farmers`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// POST   /bulk-import                        -> bulk_import
/// GET    /statistics                         -> statistics
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// DELETE /{id}                               -> delete
/// PATCH  /{id}/status                        -> update_status
///
/// GET    /{farmer_id}/projects               -> list_by_farmer
/// POST   /{farmer_id}/projects               -> create
/// GET    /{farmer_id}/projects/allocated-area -> allocated_area
/// GET    /{farmer_id}/projects/{id}          -> get_by_id
/// PUT    /{farmer_id}/projects/{id}          -> update
/// DELETE /{farmer_id}/projects/{id}          -> delete
/// PATCH  /{farmer_id}/projects/{id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    let project_routes = Router::new()
        .route("/", get(project::list_by_farmer).post(project::create))
        .route("/allocated-area", get(project::allocated_area))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/status", patch(project::update_status));

    Router::new()
        .route("/", get(farmer::list).post(farmer::create))
        .route("/bulk-import", post(farmer::bulk_import))
        .route("/statistics", get(farmer::statistics))
        .route(
            "/{id}",
            get(farmer::get_by_id)
                .put(farmer::update)
                .delete(farmer::delete),
        )
        .route("/{id}/status", patch(farmer::update_status))
        .nest("/{farmer_id}/projects", project_routes)
}
