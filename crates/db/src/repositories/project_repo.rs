//! Repository for the `projects` table.
//!
//! Projects consume slices of their farmer's declared land area. Every
//! write path here that can change the total allocation runs inside a
//! transaction that first takes a `SELECT … FOR UPDATE` lock on the
//! farmer row, so two concurrent writers serialize and each one checks
//! the invariant against committed state rather than a stale read.

use harvest_core::area::{check_candidate, check_requested_total};
use harvest_core::error::CoreError;
use harvest_core::reconcile::{plan, RequestedProject};
use harvest_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::DbError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, farmer_id, crop_name, area_ha, status, planting_date, \
    expected_harvest_date, notes, created_at, updated_at";

/// Provides CRUD, aggregate, and reconciliation operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// List all projects for a farmer, oldest first (stable id order).
    pub async fn list_by_farmer(
        pool: &PgPool,
        farmer_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE farmer_id = $1 ORDER BY id");
        sqlx::query_as::<_, Project>(&query)
            .bind(farmer_id)
            .fetch_all(pool)
            .await
    }

    /// Find a project by ID scoped to its farmer.
    pub async fn find_by_id_and_farmer(
        pool: &PgPool,
        id: DbId,
        farmer_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND farmer_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(farmer_id)
            .fetch_optional(pool)
            .await
    }

    /// Total area allocated to a farmer's projects. Zero when none exist.
    pub async fn sum_area_by_farmer(pool: &PgPool, farmer_id: DbId) -> Result<f64, sqlx::Error> {
        let row: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(area_ha), 0.0) FROM projects WHERE farmer_id = $1",
        )
        .bind(farmer_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Total area allocated across all farmers of a cooperative.
    pub async fn sum_area_by_cooperative(
        pool: &PgPool,
        cooperative_id: DbId,
    ) -> Result<f64, sqlx::Error> {
        let row: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(p.area_ha), 0.0)
             FROM projects p
             JOIN farmers f ON f.id = p.farmer_id
             WHERE f.cooperative_id = $1",
        )
        .bind(cooperative_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Count a farmer's projects.
    pub async fn count_by_farmer(pool: &PgPool, farmer_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE farmer_id = $1")
            .bind(farmer_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Insert a project for a farmer, enforcing the area invariant under
    /// the farmer row lock.
    pub async fn create_guarded(
        pool: &PgPool,
        farmer_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, DbError> {
        let mut tx = pool.begin().await?;

        let total_area = lock_farmer_area(&mut tx, farmer_id).await?;
        let allocated = sum_area_in_tx(&mut tx, farmer_id).await?;
        check_candidate(total_area, allocated, input.area_ha)?;

        let query = format!(
            "INSERT INTO projects
                (farmer_id, crop_name, area_ha, status, planting_date,
                 expected_harvest_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(farmer_id)
            .bind(&input.crop_name)
            .bind(input.area_ha)
            .bind(&input.status)
            .bind(input.planting_date)
            .bind(input.expected_harvest_date)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Apply a full-replace update to one project, enforcing the area
    /// invariant under the farmer row lock when the area changes.
    ///
    /// Returns `Ok(None)` if the project does not exist for this farmer.
    pub async fn update_guarded(
        pool: &PgPool,
        id: DbId,
        farmer_id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, DbError> {
        let mut tx = pool.begin().await?;

        let total_area = lock_farmer_area(&mut tx, farmer_id).await?;

        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND farmer_id = $2");
        let Some(existing) = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(farmer_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        // Unchanged area never re-trips the guard, even on rows that are
        // already over-committed through out-of-band edits.
        if existing.area_ha != input.area_ha {
            let allocated = sum_area_in_tx(&mut tx, farmer_id).await?;
            check_candidate(total_area, allocated - existing.area_ha, input.area_ha)?;
        }

        let query = format!(
            "UPDATE projects SET
                crop_name = $3,
                area_ha = $4,
                status = COALESCE($5, status),
                planting_date = $6,
                expected_harvest_date = $7,
                notes = $8,
                updated_at = NOW()
             WHERE id = $1 AND farmer_id = $2
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(farmer_id)
            .bind(&input.crop_name)
            .bind(input.area_ha)
            .bind(&input.status)
            .bind(input.planting_date)
            .bind(input.expected_harvest_date)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Set a project's status. Returns `None` if no row matched.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        farmer_id: DbId,
        status: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status = $3, updated_at = NOW()
             WHERE id = $1 AND farmer_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(farmer_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project scoped to its farmer. Returns `true` if a row was
    /// removed.
    pub async fn delete(pool: &PgPool, id: DbId, farmer_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND farmer_id = $2")
            .bind(id)
            .bind(farmer_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all projects for a farmer. Returns the number removed.
    pub async fn delete_by_farmer(pool: &PgPool, farmer_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE farmer_id = $1")
            .bind(farmer_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Reconcile a farmer's persisted projects against the complete
    /// requested list, atomically.
    ///
    /// Inside one transaction: lock the farmer row, verify the requested
    /// total against the farmer's declared area, diff requested entries
    /// against persisted ids, then apply deletes, updates, and creates in
    /// that order. Any failure rolls the whole plan back; on success the
    /// farmer's refreshed project list is returned.
    ///
    /// An empty `requested` deletes every project. A requested id the
    /// farmer does not own is treated as a new project (stale id
    /// discarded).
    pub async fn apply_reconcile(
        pool: &PgPool,
        farmer_id: DbId,
        requested: Vec<RequestedProject>,
    ) -> Result<Vec<Project>, DbError> {
        let mut tx = pool.begin().await?;

        let total_area = lock_farmer_area(&mut tx, farmer_id).await?;

        let requested_areas: Vec<f64> = requested.iter().map(|p| p.area_ha).collect();
        check_requested_total(total_area, &requested_areas)?;

        let existing_ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM projects WHERE farmer_id = $1 ORDER BY id")
                .bind(farmer_id)
                .fetch_all(&mut *tx)
                .await?;

        let reconcile_plan = plan(&existing_ids, requested);
        tracing::info!(
            farmer_id,
            creates = reconcile_plan.creates.len(),
            updates = reconcile_plan.updates.len(),
            deletes = reconcile_plan.delete_ids.len(),
            "Applying project reconciliation"
        );

        if !reconcile_plan.delete_ids.is_empty() {
            sqlx::query("DELETE FROM projects WHERE farmer_id = $1 AND id = ANY($2)")
                .bind(farmer_id)
                .bind(&reconcile_plan.delete_ids)
                .execute(&mut *tx)
                .await?;
        }

        for (id, fields) in &reconcile_plan.updates {
            sqlx::query(
                "UPDATE projects SET
                    crop_name = $3,
                    area_ha = $4,
                    status = $5,
                    planting_date = $6,
                    expected_harvest_date = $7,
                    notes = $8,
                    updated_at = NOW()
                 WHERE id = $1 AND farmer_id = $2",
            )
            .bind(id)
            .bind(farmer_id)
            .bind(&fields.crop_name)
            .bind(fields.area_ha)
            .bind(fields.status.as_str())
            .bind(fields.planting_date)
            .bind(fields.expected_harvest_date)
            .bind(&fields.notes)
            .execute(&mut *tx)
            .await?;
        }

        for fields in &reconcile_plan.creates {
            sqlx::query(
                "INSERT INTO projects
                    (farmer_id, crop_name, area_ha, status, planting_date,
                     expected_harvest_date, notes)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(farmer_id)
            .bind(&fields.crop_name)
            .bind(fields.area_ha)
            .bind(fields.status.as_str())
            .bind(fields.planting_date)
            .bind(fields.expected_harvest_date)
            .bind(&fields.notes)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!("SELECT {COLUMNS} FROM projects WHERE farmer_id = $1 ORDER BY id");
        let refreshed = sqlx::query_as::<_, Project>(&query)
            .bind(farmer_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(refreshed)
    }
}

/// Lock the farmer row for the duration of the transaction and return its
/// declared total area.
async fn lock_farmer_area(
    tx: &mut Transaction<'_, Postgres>,
    farmer_id: DbId,
) -> Result<f64, DbError> {
    let area: Option<f64> =
        sqlx::query_scalar("SELECT area_ha FROM farmers WHERE id = $1 FOR UPDATE")
            .bind(farmer_id)
            .fetch_optional(&mut **tx)
            .await?;
    area.ok_or(DbError::Domain(CoreError::NotFound {
        entity: "Farmer",
        id: farmer_id,
    }))
}

/// Sum a farmer's allocated area from inside an open transaction.
async fn sum_area_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    farmer_id: DbId,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar("SELECT COALESCE(SUM(area_ha), 0.0) FROM projects WHERE farmer_id = $1")
        .bind(farmer_id)
        .fetch_one(&mut **tx)
        .await
}
