//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /cooperatives/pending       -> list_pending
/// POST /cooperatives/{id}/approve  -> approve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cooperatives/pending", get(admin::list_pending))
        .route("/cooperatives/{id}/approve", post(admin::approve))
}
