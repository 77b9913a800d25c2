//! Handlers for the `/admin` resource: cooperative account approval.

use axum::extract::{Path, State};
use axum::Json;

use harvest_core::error::CoreError;
use harvest_core::types::DbId;
use harvest_db::models::user::{User, ROLE_COOPERATIVE};
use harvest_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/cooperatives/pending
///
/// List cooperative accounts awaiting approval, oldest first.
pub async fn list_pending(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    auth.require_admin()?;

    let pending = UserRepo::list_pending_cooperatives(&state.pool).await?;
    Ok(Json(DataResponse { data: pending }))
}

/// POST /api/v1/admin/cooperatives/{id}/approve
///
/// Approve a pending cooperative account so it can log in.
pub async fn approve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    auth.require_admin()?;

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if user.role != ROLE_COOPERATIVE {
        return Err(AppError::BadRequest(
            "User is not a cooperative account".to_string(),
        ));
    }

    let approved = UserRepo::approve(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, "Cooperative account approved");

    Ok(Json(DataResponse { data: approved }))
}
