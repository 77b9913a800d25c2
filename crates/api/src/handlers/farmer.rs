//! Handlers for the `/cooperative/farmers` resource.
//!
//! This module owns the farmer aggregate: creating and updating a farmer
//! together with its crop projects, enforcing the area-allocation
//! invariant, and the spreadsheet bulk import with per-row failure
//! isolation. All operations are scoped to the authenticated caller's
//! cooperative.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use harvest_core::area::check_requested_total;
use harvest_core::error::CoreError;
use harvest_core::geo::validate_coordinates;
use harvest_core::language::validate_language;
use harvest_core::location::validate_location;
use harvest_core::phone::validate_phone;
use harvest_core::qr::{generate_qr_code, MAX_QR_ATTEMPTS};
use harvest_core::reconcile::RequestedProject;
use harvest_core::status::{FarmerStatus, ProjectStatus};
use harvest_core::types::{DbId, Timestamp};
use harvest_db::models::cooperative::Cooperative;
use harvest_db::models::farmer::{CreateFarmer, Farmer, UpdateFarmer};
use harvest_db::models::project::{CreateProject, Project};
use harvest_db::repositories::farmer_repo::FarmerFilter;
use harvest_db::repositories::{CooperativeRepo, FarmerRepo, ProjectRepo};
use harvest_db::{clamp_limit, clamp_offset, DbPool};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A farmer payload as submitted by create, update, and bulk import.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FarmerPayload {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub language: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Area must be positive"))]
    pub area_ha: f64,
    /// `active` / `inactive`; defaults to `active`.
    pub status: Option<String>,
    /// Complete desired project list. On update, omitted and empty mean
    /// the same thing: no projects remain.
    #[validate(nested)]
    pub projects: Option<Vec<ProjectPayload>>,
    pub coordinates: Option<CoordinatesPayload>,
}

/// One project entry nested in a farmer payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectPayload {
    /// Present when the entry refers to an already-persisted project.
    pub id: Option<DbId>,
    #[validate(length(min = 1, message = "Crop name is required"))]
    pub crop_name: String,
    #[validate(range(exclusive_min = 0.0, message = "Area must be positive"))]
    pub area_ha: f64,
    pub status: Option<String>,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Geocoordinates nested in a farmer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatesPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

/// Query parameters for the farmer listing.
#[derive(Debug, Deserialize)]
pub struct FarmerListParams {
    /// `active`, `inactive`, or `all` (default).
    pub status: Option<String>,
    /// Substring match over name, phone, and location.
    pub search: Option<String>,
    /// `name` (default), `location`, `area`, or `date`.
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    pub sort_order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameter for the status update endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusParam {
    pub status: String,
}

/// Request body for `POST /cooperative/farmers/bulk-import`.
#[derive(Debug, Deserialize)]
pub struct BulkImportRequest {
    pub farmers: Vec<FarmerPayload>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Farmer representation returned by every endpoint.
///
/// `allocated_area` and `remaining_area` are derived from the current
/// project set; `remaining_area` is floored at zero. Project detail is
/// included on single-farmer views and omitted from listings.
#[derive(Debug, Serialize)]
pub struct FarmerView {
    pub id: DbId,
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub language: Option<String>,
    pub area_ha: f64,
    pub allocated_area: f64,
    pub remaining_area: f64,
    pub status: String,
    pub qr_code: String,
    pub coordinates: Option<CoordinatesPayload>,
    pub cooperative_id: DbId,
    pub cooperative_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectView>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Project representation nested in farmer views and returned by the
/// project endpoints.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub id: DbId,
    pub crop_name: String,
    pub area_ha: f64,
    pub status: String,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub farmer_id: DbId,
    pub farmer_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Aggregate statistics for a cooperative's farmers.
///
/// `total_remaining_area` is `total_area - total_allocated_area` without
/// a floor: unlike the per-farmer view, a negative aggregate remainder is
/// reported as-is so over-committed data stays visible.
#[derive(Debug, Serialize)]
pub struct FarmerStatistics {
    pub total_farmers: i64,
    pub active_farmers: i64,
    pub inactive_farmers: i64,
    pub total_area: f64,
    pub total_allocated_area: f64,
    pub total_remaining_area: f64,
}

/// One failed row in a bulk import.
#[derive(Debug, Serialize)]
pub struct ImportError {
    /// Spreadsheet row number: 1-based data index plus one header row.
    pub row: usize,
    /// The submitted fields, echoed back unmodified.
    pub farmer: serde_json::Value,
    pub error: String,
}

/// Result of a bulk import: mixed success/failure, always returned with
/// status 200.
#[derive(Debug, Serialize)]
pub struct BulkImportReport {
    pub total_processed: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub errors: Vec<ImportError>,
    pub imported_farmers: Vec<FarmerView>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Run declarative payload validation, flattening violations into one
/// bad-request message.
fn check_payload(input: &impl Validate) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string().replace('\n', "; ")))
}

/// Farmer fields after domain validation and normalization.
struct ValidatedFarmer {
    full_name: String,
    phone_number: String,
    location: String,
    language: Option<String>,
    status: FarmerStatus,
}

/// Validate and normalize the scalar farmer fields: phone format and
/// normalization, location/region, optional language, optional
/// coordinates, and the status string.
fn validate_farmer_fields(input: &FarmerPayload) -> AppResult<ValidatedFarmer> {
    let phone_number = validate_phone(&input.phone_number)?;
    validate_location(&input.location)?;
    let language = validate_language(input.language.as_deref())?;

    if let Some(coords) = &input.coordinates {
        validate_coordinates(coords.latitude, coords.longitude)?;
    }

    let status = parse_farmer_status(input.status.as_deref())?;

    Ok(ValidatedFarmer {
        full_name: input.full_name.trim().to_string(),
        phone_number,
        location: input.location.trim().to_string(),
        language,
        status,
    })
}

/// Parse an optional farmer status, defaulting to `active`.
pub(crate) fn parse_farmer_status(status: Option<&str>) -> AppResult<FarmerStatus> {
    match status {
        None => Ok(FarmerStatus::Active),
        Some(raw) => FarmerStatus::parse(raw.trim()).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid status. Must be one of: {}",
                FarmerStatus::ALL.join(", ")
            ))
        }),
    }
}

/// Parse an optional project status, defaulting to `active`.
pub(crate) fn parse_project_status(status: Option<&str>) -> AppResult<ProjectStatus> {
    match status {
        None => Ok(ProjectStatus::Active),
        Some(raw) => ProjectStatus::parse(raw.trim()).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid status. Must be one of: {}",
                ProjectStatus::ALL.join(", ")
            ))
        }),
    }
}

/// Convert submitted project entries into reconciliation inputs,
/// validating each entry's status and trimming text fields.
fn parse_requested_projects(payloads: &[ProjectPayload]) -> AppResult<Vec<RequestedProject>> {
    payloads
        .iter()
        .map(|p| {
            Ok(RequestedProject {
                id: p.id,
                crop_name: p.crop_name.trim().to_string(),
                area_ha: p.area_ha,
                status: parse_project_status(p.status.as_deref())?,
                planting_date: p.planting_date,
                expected_harvest_date: p.expected_harvest_date,
                notes: p.notes.as_deref().map(|n| n.trim().to_string()),
            })
        })
        .collect()
}

/// Reject a duplicate phone or name within the cooperative.
async fn check_duplicates(
    pool: &DbPool,
    cooperative_id: DbId,
    phone_number: &str,
    full_name: &str,
) -> AppResult<()> {
    if FarmerRepo::exists_by_phone_and_cooperative(pool, phone_number, cooperative_id).await? {
        return Err(AppError::BadRequest(format!(
            "Farmer with phone number {phone_number} already exists in your cooperative"
        )));
    }
    if FarmerRepo::exists_by_name_and_cooperative(pool, full_name, cooperative_id).await? {
        return Err(AppError::BadRequest(format!(
            "Farmer with name \"{full_name}\" already exists in your cooperative"
        )));
    }
    Ok(())
}

/// Generate a QR code that no farmer on the platform uses yet.
///
/// Collisions are retried a bounded number of times; exhaustion is an
/// internal error rather than an infinite loop.
async fn generate_unique_qr(pool: &DbPool) -> AppResult<String> {
    for _ in 0..MAX_QR_ATTEMPTS {
        let code = generate_qr_code();
        if !FarmerRepo::exists_by_qr_code(pool, &code).await? {
            return Ok(code);
        }
    }
    Err(AppError::Core(CoreError::Internal(
        "Failed to generate a unique QR code".into(),
    )))
}

// ---------------------------------------------------------------------------
// View building
// ---------------------------------------------------------------------------

/// Build a project view nested under its farmer.
pub(crate) fn project_view(project: Project, farmer: &Farmer) -> ProjectView {
    ProjectView {
        id: project.id,
        crop_name: project.crop_name,
        area_ha: project.area_ha,
        status: project.status,
        planting_date: project.planting_date,
        expected_harvest_date: project.expected_harvest_date,
        notes: project.notes,
        farmer_id: farmer.id,
        farmer_name: farmer.full_name.clone(),
        created_at: project.created_at,
        updated_at: project.updated_at,
    }
}

/// Assemble the farmer view: derived allocated/remaining areas plus
/// optional project detail.
async fn farmer_view(
    pool: &DbPool,
    farmer: Farmer,
    cooperative: &Cooperative,
    include_projects: bool,
) -> AppResult<FarmerView> {
    let allocated_area = ProjectRepo::sum_area_by_farmer(pool, farmer.id).await?;
    let remaining_area = harvest_core::area::remaining_area(farmer.area_ha, allocated_area);

    let projects = if include_projects {
        let rows = ProjectRepo::list_by_farmer(pool, farmer.id).await?;
        Some(rows.into_iter().map(|p| project_view(p, &farmer)).collect())
    } else {
        None
    };

    let coordinates = match (farmer.latitude, farmer.longitude) {
        (Some(latitude), Some(longitude)) => Some(CoordinatesPayload {
            latitude,
            longitude,
            address: farmer.address.clone(),
        }),
        _ => None,
    };

    Ok(FarmerView {
        id: farmer.id,
        full_name: farmer.full_name,
        phone_number: farmer.phone_number,
        location: farmer.location,
        language: farmer.language,
        area_ha: farmer.area_ha,
        allocated_area,
        remaining_area,
        status: farmer.status,
        qr_code: farmer.qr_code,
        coordinates,
        cooperative_id: cooperative.id,
        cooperative_name: cooperative.name.clone(),
        projects,
        created_at: farmer.created_at,
        updated_at: farmer.updated_at,
    })
}

/// Resolve the caller's cooperative row.
async fn load_cooperative(pool: &DbPool, cooperative_id: DbId) -> AppResult<Cooperative> {
    CooperativeRepo::find_by_id(pool, cooperative_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cooperative",
            id: cooperative_id,
        }))
}

/// Load a farmer scoped to the caller's cooperative.
async fn load_scoped_farmer(
    pool: &DbPool,
    farmer_id: DbId,
    cooperative_id: DbId,
) -> AppResult<Farmer> {
    FarmerRepo::find_by_id_and_cooperative(pool, farmer_id, cooperative_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Farmer",
            id: farmer_id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/cooperative/farmers
///
/// Paginated listing with status filter, substring search, and
/// whitelisted sorting. Views omit project detail.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FarmerListParams>,
) -> AppResult<Json<DataResponse<PagedResponse<FarmerView>>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let cooperative = load_cooperative(&state.pool, cooperative_id).await?;

    let status_filter = match params.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(parse_farmer_status(Some(raw))?),
    };
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let filter = FarmerFilter {
        status: status_filter.map(|s| s.as_str()),
        search,
    };
    let descending = params
        .sort_order
        .as_deref()
        .is_some_and(|o| o.eq_ignore_ascii_case("desc"));
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let rows = FarmerRepo::list_by_cooperative(
        &state.pool,
        cooperative_id,
        &filter,
        params.sort_by.as_deref().unwrap_or("name"),
        descending,
        limit,
        offset,
    )
    .await?;
    let total = FarmerRepo::count_filtered(&state.pool, cooperative_id, &filter).await?;

    let mut items = Vec::with_capacity(rows.len());
    for farmer in rows {
        items.push(farmer_view(&state.pool, farmer, &cooperative, false).await?);
    }

    Ok(Json(DataResponse {
        data: PagedResponse {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/cooperative/farmers/{id}
///
/// Single-farmer detail view, including projects.
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FarmerView>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let cooperative = load_cooperative(&state.pool, cooperative_id).await?;
    let farmer = load_scoped_farmer(&state.pool, id, cooperative_id).await?;

    let view = farmer_view(&state.pool, farmer, &cooperative, true).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/cooperative/farmers
///
/// Create a farmer, optionally with an initial project list. The
/// requested projects' total area is checked against the declared farm
/// area before anything is written; farmer and projects land in one
/// transaction.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<FarmerPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<FarmerView>>)> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let cooperative = load_cooperative(&state.pool, cooperative_id).await?;

    check_payload(&input)?;
    let validated = validate_farmer_fields(&input)?;

    check_duplicates(
        &state.pool,
        cooperative_id,
        &validated.phone_number,
        &validated.full_name,
    )
    .await?;

    let requested = parse_requested_projects(input.projects.as_deref().unwrap_or_default())?;
    let requested_areas: Vec<f64> = requested.iter().map(|p| p.area_ha).collect();
    check_requested_total(input.area_ha, &requested_areas)?;

    let qr_code = generate_unique_qr(&state.pool).await?;

    let create = CreateFarmer {
        cooperative_id,
        full_name: validated.full_name,
        phone_number: validated.phone_number,
        location: validated.location,
        language: validated.language,
        area_ha: input.area_ha,
        status: validated.status.as_str().to_string(),
        qr_code,
        latitude: input.coordinates.as_ref().map(|c| c.latitude),
        longitude: input.coordinates.as_ref().map(|c| c.longitude),
        address: input.coordinates.as_ref().and_then(|c| c.address.clone()),
    };
    let initial_projects: Vec<CreateProject> = requested
        .into_iter()
        .map(|p| CreateProject {
            crop_name: p.crop_name,
            area_ha: p.area_ha,
            status: p.status.as_str().to_string(),
            planting_date: p.planting_date,
            expected_harvest_date: p.expected_harvest_date,
            notes: p.notes,
        })
        .collect();

    let farmer = FarmerRepo::create_with_projects(&state.pool, &create, &initial_projects).await?;

    tracing::info!(
        farmer_id = farmer.id,
        cooperative_id,
        projects = initial_projects.len(),
        "Farmer created"
    );

    let view = farmer_view(&state.pool, farmer, &cooperative, true).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// PUT /api/v1/cooperative/farmers/{id}
///
/// Full-replace update of the farmer's fields plus reconciliation of its
/// project set: matched ids are updated, new entries created, and any
/// persisted project the request no longer lists is deleted. An
/// over-allocated request fails before any change is applied.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<FarmerPayload>,
) -> AppResult<Json<DataResponse<FarmerView>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let cooperative = load_cooperative(&state.pool, cooperative_id).await?;

    check_payload(&input)?;
    let validated = validate_farmer_fields(&input)?;

    let farmer = load_scoped_farmer(&state.pool, id, cooperative_id).await?;

    // Uniqueness is re-checked only for values that actually change, so a
    // farmer can always be re-saved under its own phone and name.
    if farmer.phone_number != validated.phone_number
        && FarmerRepo::exists_by_phone_and_cooperative(
            &state.pool,
            &validated.phone_number,
            cooperative_id,
        )
        .await?
    {
        return Err(AppError::BadRequest(format!(
            "Farmer with phone number {} already exists in your cooperative",
            validated.phone_number
        )));
    }
    if !farmer.full_name.eq_ignore_ascii_case(&validated.full_name)
        && FarmerRepo::exists_by_name_and_cooperative(
            &state.pool,
            &validated.full_name,
            cooperative_id,
        )
        .await?
    {
        return Err(AppError::BadRequest(format!(
            "Farmer with name \"{}\" already exists in your cooperative",
            validated.full_name
        )));
    }

    let requested = parse_requested_projects(input.projects.as_deref().unwrap_or_default())?;
    let requested_areas: Vec<f64> = requested.iter().map(|p| p.area_ha).collect();
    check_requested_total(input.area_ha, &requested_areas)?;

    let update = UpdateFarmer {
        full_name: validated.full_name,
        phone_number: validated.phone_number,
        location: validated.location,
        language: validated.language,
        area_ha: input.area_ha,
        status: input.status.map(|_| validated.status.as_str().to_string()),
        latitude: input.coordinates.as_ref().map(|c| c.latitude),
        longitude: input.coordinates.as_ref().map(|c| c.longitude),
        address: input.coordinates.as_ref().and_then(|c| c.address.clone()),
    };
    FarmerRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Farmer",
            id,
        }))?;

    // Reconcile projects under the farmer row lock; the area total is
    // re-verified in-transaction against the just-updated declared area.
    ProjectRepo::apply_reconcile(&state.pool, id, requested).await?;

    let refreshed = load_scoped_farmer(&state.pool, id, cooperative_id).await?;
    tracing::info!(farmer_id = id, cooperative_id, "Farmer updated");

    let view = farmer_view(&state.pool, refreshed, &cooperative, true).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/cooperative/farmers/{id}
///
/// Delete a farmer and all of its projects.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, id, cooperative_id).await?;

    FarmerRepo::delete_with_projects(&state.pool, farmer.id).await?;
    tracing::info!(farmer_id = id, cooperative_id, "Farmer deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/cooperative/farmers/{id}/status?status=active|inactive
///
/// Lightweight status flip; the returned view omits project detail.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<StatusParam>,
) -> AppResult<Json<DataResponse<FarmerView>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let cooperative = load_cooperative(&state.pool, cooperative_id).await?;

    let status = FarmerStatus::parse(params.status.trim()).ok_or_else(|| {
        AppError::BadRequest("Invalid status. Must be 'active' or 'inactive'".to_string())
    })?;

    let farmer = FarmerRepo::update_status(&state.pool, id, cooperative_id, status.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Farmer",
            id,
        }))?;

    tracing::info!(farmer_id = id, status = %status, "Farmer status updated");

    let view = farmer_view(&state.pool, farmer, &cooperative, false).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/cooperative/farmers/statistics
///
/// Aggregate counts and area sums for the caller's cooperative.
pub async fn statistics(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<FarmerStatistics>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    load_cooperative(&state.pool, cooperative_id).await?;

    let total_farmers = FarmerRepo::count_by_cooperative(&state.pool, cooperative_id).await?;
    let active_farmers =
        FarmerRepo::count_by_cooperative_and_status(&state.pool, cooperative_id, "active").await?;
    let inactive_farmers =
        FarmerRepo::count_by_cooperative_and_status(&state.pool, cooperative_id, "inactive")
            .await?;
    let total_area = FarmerRepo::sum_area_by_cooperative(&state.pool, cooperative_id).await?;
    let total_allocated_area =
        ProjectRepo::sum_area_by_cooperative(&state.pool, cooperative_id).await?;

    Ok(Json(DataResponse {
        data: FarmerStatistics {
            total_farmers,
            active_farmers,
            inactive_farmers,
            total_area,
            total_allocated_area,
            // Deliberately unfloored, unlike the per-farmer remainder.
            total_remaining_area: total_area - total_allocated_area,
        },
    }))
}

/// POST /api/v1/cooperative/farmers/bulk-import
///
/// Import a batch of farmers with per-row failure isolation: every row is
/// validated and persisted independently, a failing row is recorded in
/// the report and never aborts the batch. Nested projects are not
/// accepted through this path. Always responds 200 with the mixed report.
pub async fn bulk_import(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkImportRequest>,
) -> AppResult<Json<DataResponse<BulkImportReport>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let cooperative = load_cooperative(&state.pool, cooperative_id).await?;

    tracing::info!(
        cooperative_id,
        rows = input.farmers.len(),
        "Starting bulk farmer import"
    );

    let mut report = BulkImportReport {
        total_processed: input.farmers.len(),
        success_count: 0,
        failure_count: 0,
        errors: Vec::new(),
        imported_farmers: Vec::new(),
    };

    for (index, row) in input.farmers.iter().enumerate() {
        // Spreadsheet row number: data starts at row 2, under the header.
        let row_number = index + 2;

        match import_row(&state.pool, &cooperative, row).await {
            Ok(view) => {
                report.imported_farmers.push(view);
                report.success_count += 1;
            }
            Err(err) => {
                let message = err.parts().2;
                tracing::warn!(row = row_number, error = %message, "Bulk import row failed");

                report.errors.push(ImportError {
                    row: row_number,
                    farmer: row_snapshot(row),
                    error: message,
                });
                report.failure_count += 1;
            }
        }
    }

    tracing::info!(
        cooperative_id,
        success = report.success_count,
        failed = report.failure_count,
        "Bulk import completed"
    );

    Ok(Json(DataResponse { data: report }))
}

/// Validate and persist one bulk-import row.
///
/// Runs the same pipeline as single create, minus nested projects. The
/// leading required-field checks duplicate part of the field validation
/// on purpose: spreadsheet users get one uniform message per missing
/// cell.
async fn import_row(
    pool: &DbPool,
    cooperative: &Cooperative,
    row: &FarmerPayload,
) -> AppResult<FarmerView> {
    if row.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("Full name is required".to_string()));
    }
    if row.phone_number.trim().is_empty() {
        return Err(AppError::BadRequest("Phone number is required".to_string()));
    }
    if row.location.trim().is_empty() {
        return Err(AppError::BadRequest("Location is required".to_string()));
    }
    if row.area_ha <= 0.0 {
        return Err(AppError::BadRequest(
            "Area must be greater than 0".to_string(),
        ));
    }

    let validated = validate_farmer_fields(row)?;
    check_duplicates(pool, cooperative.id, &validated.phone_number, &validated.full_name).await?;

    let qr_code = generate_unique_qr(pool).await?;

    let farmer = FarmerRepo::create(
        pool,
        &CreateFarmer {
            cooperative_id: cooperative.id,
            full_name: validated.full_name,
            phone_number: validated.phone_number,
            location: validated.location,
            language: validated.language,
            area_ha: row.area_ha,
            status: validated.status.as_str().to_string(),
            qr_code,
            latitude: row.coordinates.as_ref().map(|c| c.latitude),
            longitude: row.coordinates.as_ref().map(|c| c.longitude),
            address: row.coordinates.as_ref().and_then(|c| c.address.clone()),
        },
    )
    .await?;

    farmer_view(pool, farmer, cooperative, false).await
}

/// Echo the submitted row fields for the error report, before any
/// normalization.
fn row_snapshot(row: &FarmerPayload) -> serde_json::Value {
    json!({
        "full_name": row.full_name,
        "phone_number": row.phone_number,
        "location": row.location,
        "language": row.language,
        "area_ha": row.area_ha,
        "coordinates": row.coordinates,
    })
}
