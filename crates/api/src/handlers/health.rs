//! Health check handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Health probe response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /health
///
/// Liveness plus a database round-trip. Reports `degraded` instead of
/// failing the request when the database is unreachable, so load
/// balancers can distinguish app-up/db-down from app-down.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let database = match harvest_db::health_check(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "degraded"
        }
    };

    Ok(Json(HealthResponse {
        status: "ok",
        database,
    }))
}
