//! Route tree assembly.

pub mod admin;
pub mod auth;
pub mod farmer;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/signup                          cooperative self-registration (public)
/// /auth/login                           login (public)
///
/// /admin/cooperatives/pending           pending accounts (admin only)
/// /admin/cooperatives/{id}/approve      approve account (admin only)
///
/// /cooperative/farmers                  list, create
/// /cooperative/farmers/bulk-import      batch create with per-row report
/// /cooperative/farmers/statistics       aggregate counts and areas
/// /cooperative/farmers/{id}             get, update, delete
/// /cooperative/farmers/{id}/status      status flip
/// /cooperative/farmers/{id}/projects    nested project CRUD
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/cooperative/farmers", farmer::router())
}
