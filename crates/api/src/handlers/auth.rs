//! Handlers for the `/auth` resource (cooperative signup and login).
//!
//! Signup creates the cooperative and its login account in one request;
//! the account stays unusable until a platform admin approves it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use harvest_core::error::CoreError;
use harvest_core::phone::validate_phone;
use harvest_core::types::DbId;
use harvest_db::models::cooperative::CreateCooperative;
use harvest_db::models::user::{CreateUser, ROLE_COOPERATIVE};
use harvest_db::repositories::{CooperativeRepo, UserRepo};
use harvest_db::DbPool;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Attempts at generating an unused registration number before giving up.
const MAX_REGISTRATION_ATTEMPTS: u32 = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "Cooperative name is required"))]
    pub cooperative_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    pub password: String,
    /// Cooperative contact phone, validated like farmer numbers.
    pub contact_number: Option<String>,
    /// Free-form location used for both address and region.
    pub location: Option<String>,
}

/// Response body for a successful signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: DbId,
    pub cooperative_id: DbId,
    pub registration_number: String,
    pub message: &'static str,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub cooperative_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a cooperative and its login account. The account is created
/// unapproved; login is refused until an admin validates it.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_password_strength(&input.password).map_err(AppError::BadRequest)?;

    let contact_number = match input.contact_number.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(validate_phone(raw)?),
        _ => None,
    };

    let name = input.cooperative_name.trim().to_string();
    let email = input.email.trim().to_lowercase();

    if UserRepo::exists_by_email(&state.pool, &email).await? {
        return Err(AppError::BadRequest(format!(
            "Email {email} is already registered"
        )));
    }
    if CooperativeRepo::exists_by_name(&state.pool, &name).await? {
        return Err(AppError::BadRequest(format!(
            "Cooperative with name \"{name}\" already exists"
        )));
    }

    let registration_number = generate_registration_number(&state.pool).await?;
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let cooperative = CooperativeRepo::create(
        &state.pool,
        &CreateCooperative {
            name: name.clone(),
            registration_number: registration_number.clone(),
            email: email.clone(),
            contact_number,
            address: input.location.clone(),
            region: input.location.clone(),
        },
    )
    .await?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            full_name: format!("{name} Admin"),
            role: ROLE_COOPERATIVE.to_string(),
            cooperative_id: Some(cooperative.id),
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        cooperative_id = cooperative.id,
        "Cooperative signed up, pending approval"
    );

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id,
            cooperative_id: cooperative.id,
            registration_number,
            message: "Registration successful. Your account is pending approval by admin.",
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Unapproved cooperative accounts
/// are refused even with correct credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    if user.role == ROLE_COOPERATIVE && !user.is_approved {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is pending approval by admin".into(),
        )));
    }

    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            cooperative_id: user.cooperative_id,
        },
    }))
}

/// Generate a registration number that is not yet taken.
async fn generate_registration_number(pool: &DbPool) -> AppResult<String> {
    for _ in 0..MAX_REGISTRATION_ATTEMPTS {
        let uuid = Uuid::new_v4().simple().to_string();
        let candidate = format!("COOP-{}", uuid[..8].to_uppercase());
        if !CooperativeRepo::exists_by_registration_number(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Core(CoreError::Internal(
        "Failed to generate a unique registration number".into(),
    )))
}
