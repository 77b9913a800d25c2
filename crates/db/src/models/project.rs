//! Crop project entity model and DTOs.

use chrono::NaiveDate;
use harvest_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub farmer_id: DbId,
    pub crop_name: String,
    pub area_ha: f64,
    pub status: String,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new project under a farmer.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub crop_name: String,
    pub area_ha: f64,
    pub status: String,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// DTO for a full-replace project update.
#[derive(Debug, Clone)]
pub struct UpdateProject {
    pub crop_name: String,
    pub area_ha: f64,
    pub status: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
