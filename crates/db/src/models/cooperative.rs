//! Cooperative (tenant) entity model and DTOs.

use harvest_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A cooperative row from the `cooperatives` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cooperative {
    pub id: DbId,
    pub name: String,
    pub registration_number: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new cooperative.
#[derive(Debug, Clone)]
pub struct CreateCooperative {
    pub name: String,
    pub registration_number: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
}
