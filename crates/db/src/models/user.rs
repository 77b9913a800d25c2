//! User (account) entity model and DTOs.

use harvest_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Role name for platform administrators.
pub const ROLE_ADMIN: &str = "admin";
/// Role name for cooperative accounts.
pub const ROLE_COOPERATIVE: &str = "cooperative";

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub is_approved: bool,
    pub cooperative_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub cooperative_id: Option<DbId>,
}
