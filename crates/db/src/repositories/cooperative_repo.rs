//! Repository for the `cooperatives` table.

use harvest_core::types::DbId;
use sqlx::PgPool;

use crate::models::cooperative::{Cooperative, CreateCooperative};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, registration_number, email, contact_number, \
    address, region, created_at, updated_at";

/// Provides CRUD operations for cooperatives.
pub struct CooperativeRepo;

impl CooperativeRepo {
    /// Insert a new cooperative, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCooperative,
    ) -> Result<Cooperative, sqlx::Error> {
        let query = format!(
            "INSERT INTO cooperatives (name, registration_number, email, contact_number, address, region)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cooperative>(&query)
            .bind(&input.name)
            .bind(&input.registration_number)
            .bind(&input.email)
            .bind(&input.contact_number)
            .bind(&input.address)
            .bind(&input.region)
            .fetch_one(pool)
            .await
    }

    /// Find a cooperative by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Cooperative>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cooperatives WHERE id = $1");
        sqlx::query_as::<_, Cooperative>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Check whether a cooperative exists.
    pub async fn exists_by_id(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cooperatives WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Check whether a cooperative name is taken.
    pub async fn exists_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cooperatives WHERE name = $1)")
                .bind(name)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Check whether a registration number is taken.
    pub async fn exists_by_registration_number(
        pool: &PgPool,
        registration_number: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM cooperatives WHERE registration_number = $1)",
        )
        .bind(registration_number)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
