//! Farmer entity model and DTOs.

use harvest_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A farmer row from the `farmers` table.
///
/// `phone_number` is always the normalized `+237…` form and `status` is
/// one of `harvest_core::status::FarmerStatus::ALL`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Farmer {
    pub id: DbId,
    pub cooperative_id: DbId,
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub language: Option<String>,
    pub area_ha: f64,
    pub status: String,
    pub qr_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new farmer. All values are pre-validated and
/// normalized by the caller.
#[derive(Debug, Clone)]
pub struct CreateFarmer {
    pub cooperative_id: DbId,
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub language: Option<String>,
    pub area_ha: f64,
    pub status: String,
    pub qr_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

/// DTO for a full-replace farmer update (the farmer update endpoint is a
/// PUT carrying every field; absent coordinates clear the stored ones).
#[derive(Debug, Clone)]
pub struct UpdateFarmer {
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub language: Option<String>,
    pub area_ha: f64,
    pub status: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

/// Whitelisted sort keys for farmer listings.
///
/// Maps the public query value to the underlying column; anything
/// unrecognized falls back to sorting by name.
pub fn sort_column(sort_by: &str) -> &'static str {
    match sort_by.to_ascii_lowercase().as_str() {
        "location" => "location",
        "area" => "area_ha",
        "date" => "created_at",
        _ => "full_name",
    }
}
