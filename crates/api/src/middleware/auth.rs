//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use harvest_core::error::CoreError;
use harvest_core::types::DbId;
use harvest_db::models::user::{ROLE_ADMIN, ROLE_COOPERATIVE};
use harvest_db::repositories::UserRepo;
use harvest_db::DbPool;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, role = %auth.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's role name (`"admin"` or `"cooperative"`).
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

impl AuthUser {
    /// Gate an admin-only endpoint.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin access required".into(),
            )));
        }
        Ok(())
    }

    /// Resolve the caller to its cooperative id for tenant scoping.
    ///
    /// Every farmer/project query downstream filters by this id, so a
    /// caller can never see or touch another cooperative's records.
    /// Fails `Forbidden` for non-cooperative roles and `Unauthorized`
    /// when the account is not linked to a cooperative.
    pub async fn require_cooperative(&self, pool: &DbPool) -> AppResult<DbId> {
        if self.role != ROLE_COOPERATIVE {
            return Err(AppError::Core(CoreError::Forbidden(
                "Cooperative access required".into(),
            )));
        }

        let user = UserRepo::find_by_id(pool, self.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Unknown user account".into()))
            })?;

        user.cooperative_id.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Account is not linked to a cooperative".into(),
            ))
        })
    }
}
