//! Repository for the `farmers` table.
//!
//! Every query that reads or writes on behalf of a cooperative filters by
//! `cooperative_id` server-side; a farmer id from another tenant behaves
//! exactly like a missing row.

use harvest_core::types::DbId;
use sqlx::PgPool;

use crate::models::farmer::{sort_column, CreateFarmer, Farmer, UpdateFarmer};
use crate::models::project::CreateProject;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cooperative_id, full_name, phone_number, location, \
    language, area_ha, status, qr_code, latitude, longitude, address, \
    created_at, updated_at";

/// Filters applied to farmer listings and their counts.
#[derive(Debug, Clone, Default)]
pub struct FarmerFilter<'a> {
    /// Restrict to one status (`active` / `inactive`); `None` means all.
    pub status: Option<&'a str>,
    /// Case-insensitive substring match over name, phone, and location.
    pub search: Option<&'a str>,
}

/// Provides tenant-scoped CRUD and aggregate operations for farmers.
pub struct FarmerRepo;

impl FarmerRepo {
    /// Insert a new farmer, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFarmer) -> Result<Farmer, sqlx::Error> {
        let query = format!(
            "INSERT INTO farmers
                (cooperative_id, full_name, phone_number, location, language,
                 area_ha, status, qr_code, latitude, longitude, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Farmer>(&query)
            .bind(input.cooperative_id)
            .bind(&input.full_name)
            .bind(&input.phone_number)
            .bind(&input.location)
            .bind(&input.language)
            .bind(input.area_ha)
            .bind(&input.status)
            .bind(&input.qr_code)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    /// Insert a farmer together with its initial projects in one
    /// transaction, so a nested create either fully lands or not at all.
    pub async fn create_with_projects(
        pool: &PgPool,
        input: &CreateFarmer,
        projects: &[CreateProject],
    ) -> Result<Farmer, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO farmers
                (cooperative_id, full_name, phone_number, location, language,
                 area_ha, status, qr_code, latitude, longitude, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        let farmer = sqlx::query_as::<_, Farmer>(&query)
            .bind(input.cooperative_id)
            .bind(&input.full_name)
            .bind(&input.phone_number)
            .bind(&input.location)
            .bind(&input.language)
            .bind(input.area_ha)
            .bind(&input.status)
            .bind(&input.qr_code)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.address)
            .fetch_one(&mut *tx)
            .await?;

        for project in projects {
            sqlx::query(
                "INSERT INTO projects
                    (farmer_id, crop_name, area_ha, status, planting_date,
                     expected_harvest_date, notes)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(farmer.id)
            .bind(&project.crop_name)
            .bind(project.area_ha)
            .bind(&project.status)
            .bind(project.planting_date)
            .bind(project.expected_harvest_date)
            .bind(&project.notes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(farmer)
    }

    /// Find a farmer by ID without tenant scoping. Internal use only
    /// (refreshing an aggregate already resolved through a scoped query).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Farmer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM farmers WHERE id = $1");
        sqlx::query_as::<_, Farmer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a farmer by ID scoped to a cooperative.
    pub async fn find_by_id_and_cooperative(
        pool: &PgPool,
        id: DbId,
        cooperative_id: DbId,
    ) -> Result<Option<Farmer>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM farmers WHERE id = $1 AND cooperative_id = $2");
        sqlx::query_as::<_, Farmer>(&query)
            .bind(id)
            .bind(cooperative_id)
            .fetch_optional(pool)
            .await
    }

    /// List a cooperative's farmers with optional status/search filters,
    /// whitelisted sorting, and limit/offset pagination.
    pub async fn list_by_cooperative(
        pool: &PgPool,
        cooperative_id: DbId,
        filter: &FarmerFilter<'_>,
        sort_by: &str,
        descending: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Farmer>, sqlx::Error> {
        let column = sort_column(sort_by);
        let direction = if descending { "DESC" } else { "ASC" };
        let query = format!(
            "SELECT {COLUMNS} FROM farmers
             WHERE cooperative_id = $1
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL
                    OR full_name ILIKE $4
                    OR phone_number ILIKE $4
                    OR location ILIKE $4)
             ORDER BY {column} {direction}
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Farmer>(&query)
            .bind(cooperative_id)
            .bind(filter.status)
            .bind(filter.search)
            .bind(filter.search.map(|s| format!("%{s}%")))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a cooperative's farmers under the same filters as
    /// [`Self::list_by_cooperative`].
    pub async fn count_filtered(
        pool: &PgPool,
        cooperative_id: DbId,
        filter: &FarmerFilter<'_>,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM farmers
             WHERE cooperative_id = $1
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL
                    OR full_name ILIKE $4
                    OR phone_number ILIKE $4
                    OR location ILIKE $4)",
        )
        .bind(cooperative_id)
        .bind(filter.status)
        .bind(filter.search)
        .bind(filter.search.map(|s| format!("%{s}%")))
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Count all farmers in a cooperative.
    pub async fn count_by_cooperative(
        pool: &PgPool,
        cooperative_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM farmers WHERE cooperative_id = $1")
                .bind(cooperative_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Count a cooperative's farmers with the given status.
    pub async fn count_by_cooperative_and_status(
        pool: &PgPool,
        cooperative_id: DbId,
        status: &str,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM farmers WHERE cooperative_id = $1 AND status = $2",
        )
        .bind(cooperative_id)
        .bind(status)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Sum of declared farm areas across a cooperative. Zero when empty.
    pub async fn sum_area_by_cooperative(
        pool: &PgPool,
        cooperative_id: DbId,
    ) -> Result<f64, sqlx::Error> {
        let row: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(area_ha), 0.0) FROM farmers WHERE cooperative_id = $1",
        )
        .bind(cooperative_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Check whether a normalized phone number is already registered in a
    /// cooperative.
    pub async fn exists_by_phone_and_cooperative(
        pool: &PgPool,
        phone_number: &str,
        cooperative_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM farmers
             WHERE phone_number = $1 AND cooperative_id = $2)",
        )
        .bind(phone_number)
        .bind(cooperative_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Check whether a full name is already registered in a cooperative.
    pub async fn exists_by_name_and_cooperative(
        pool: &PgPool,
        full_name: &str,
        cooperative_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM farmers
             WHERE full_name = $1 AND cooperative_id = $2)",
        )
        .bind(full_name)
        .bind(cooperative_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Check whether a QR code is taken anywhere on the platform. QR
    /// codes are a global namespace, unlike phone numbers and names.
    pub async fn exists_by_qr_code(pool: &PgPool, qr_code: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM farmers WHERE qr_code = $1)")
                .bind(qr_code)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Apply a full-replace update to a farmer's own fields (projects are
    /// reconciled separately). Returns `None` if no row matched.
    ///
    /// A `None` status keeps the stored one; absent coordinates clear the
    /// stored values, matching the PUT semantics of the update endpoint.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFarmer,
    ) -> Result<Option<Farmer>, sqlx::Error> {
        let query = format!(
            "UPDATE farmers SET
                full_name = $2,
                phone_number = $3,
                location = $4,
                language = $5,
                area_ha = $6,
                status = COALESCE($7, status),
                latitude = $8,
                longitude = $9,
                address = $10,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Farmer>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone_number)
            .bind(&input.location)
            .bind(&input.language)
            .bind(input.area_ha)
            .bind(&input.status)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.address)
            .fetch_optional(pool)
            .await
    }

    /// Set a farmer's status. Returns `None` if no row matched the
    /// id/cooperative pair.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        cooperative_id: DbId,
        status: &str,
    ) -> Result<Option<Farmer>, sqlx::Error> {
        let query = format!(
            "UPDATE farmers SET status = $3, updated_at = NOW()
             WHERE id = $1 AND cooperative_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Farmer>(&query)
            .bind(id)
            .bind(cooperative_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a farmer and all of its projects in one transaction.
    /// Returns `true` if the farmer existed.
    pub async fn delete_with_projects(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM projects WHERE farmer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
