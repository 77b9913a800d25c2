//! Database layer: connection pool, migrations, models, and repositories.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use harvest_core::error::CoreError;

pub mod models;
pub mod repositories;

/// Alias used across the API crate for the shared connection pool.
pub type DbPool = PgPool;

/// Error type for repository methods that combine database access with
/// domain invariant checks (area guards, reconciliation).
///
/// Plain CRUD methods keep returning `sqlx::Error` directly.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Domain(#[from] CoreError),
}

/// Default page size when a list query gives no limit.
pub const DEFAULT_LIMIT: i64 = 50;

/// Hard cap on page size.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a requested limit into `[1, MAX_LIMIT]`, defaulting when absent.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
