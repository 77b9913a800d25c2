//! Handlers for the project resource nested under a farmer:
//! `/cooperative/farmers/{farmer_id}/projects[/{id}]`.
//!
//! The same area-allocation invariant as the aggregate update applies:
//! a project create or resize that would push the farmer's allocation
//! past its declared area is refused, with the figures in the message.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use harvest_core::error::CoreError;
use harvest_core::types::DbId;
use harvest_db::models::project::{CreateProject, UpdateProject};
use harvest_db::repositories::{FarmerRepo, ProjectRepo};
use harvest_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::farmer::{
    parse_project_status, project_view, ProjectPayload, ProjectView, StatusParam,
};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for the allocated-area endpoint.
#[derive(Debug, Serialize)]
pub struct AllocatedArea {
    pub allocated_area: f64,
}

/// Load a farmer scoped to the caller's cooperative, as the ownership
/// check for every nested project operation.
async fn load_scoped_farmer(
    pool: &DbPool,
    farmer_id: DbId,
    cooperative_id: DbId,
) -> AppResult<harvest_db::models::farmer::Farmer> {
    FarmerRepo::find_by_id_and_cooperative(pool, farmer_id, cooperative_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Farmer",
            id: farmer_id,
        }))
}

/// GET /api/v1/cooperative/farmers/{farmer_id}/projects
pub async fn list_by_farmer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(farmer_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectView>>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, farmer_id, cooperative_id).await?;

    let projects = ProjectRepo::list_by_farmer(&state.pool, farmer.id).await?;
    let views = projects
        .into_iter()
        .map(|p| project_view(p, &farmer))
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/cooperative/farmers/{farmer_id}/projects/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((farmer_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, farmer_id, cooperative_id).await?;

    let project = ProjectRepo::find_by_id_and_farmer(&state.pool, id, farmer.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(DataResponse {
        data: project_view(project, &farmer),
    }))
}

/// POST /api/v1/cooperative/farmers/{farmer_id}/projects
///
/// Create one project under the farmer's capacity guard.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(farmer_id): Path<DbId>,
    Json(input): Json<ProjectPayload>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectView>>)> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, farmer_id, cooperative_id).await?;

    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string().replace('\n', "; ")))?;
    let status = parse_project_status(input.status.as_deref())?;

    let create = CreateProject {
        crop_name: input.crop_name.trim().to_string(),
        area_ha: input.area_ha,
        status: status.as_str().to_string(),
        planting_date: input.planting_date,
        expected_harvest_date: input.expected_harvest_date,
        notes: input.notes.as_deref().map(|n| n.trim().to_string()),
    };

    let project = ProjectRepo::create_guarded(&state.pool, farmer.id, &create).await?;
    tracing::info!(project_id = project.id, farmer_id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: project_view(project, &farmer),
        }),
    ))
}

/// PUT /api/v1/cooperative/farmers/{farmer_id}/projects/{id}
///
/// Full-replace update; an area change is checked against the farmer's
/// remaining capacity under the row lock.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((farmer_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<ProjectPayload>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, farmer_id, cooperative_id).await?;

    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string().replace('\n', "; ")))?;

    let update = UpdateProject {
        crop_name: input.crop_name.trim().to_string(),
        area_ha: input.area_ha,
        status: match input.status.as_deref() {
            Some(raw) => Some(parse_project_status(Some(raw))?.as_str().to_string()),
            None => None,
        },
        planting_date: input.planting_date,
        expected_harvest_date: input.expected_harvest_date,
        notes: input.notes.as_deref().map(|n| n.trim().to_string()),
    };

    let project = ProjectRepo::update_guarded(&state.pool, id, farmer.id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(project_id = id, farmer_id, "Project updated");

    Ok(Json(DataResponse {
        data: project_view(project, &farmer),
    }))
}

/// DELETE /api/v1/cooperative/farmers/{farmer_id}/projects/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((farmer_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, farmer_id, cooperative_id).await?;

    let deleted = ProjectRepo::delete(&state.pool, id, farmer.id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }

    tracing::info!(project_id = id, farmer_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/cooperative/farmers/{farmer_id}/projects/{id}/status?status=...
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((farmer_id, id)): Path<(DbId, DbId)>,
    Query(params): Query<StatusParam>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, farmer_id, cooperative_id).await?;

    let status = parse_project_status(Some(&params.status))?;

    let project = ProjectRepo::update_status(&state.pool, id, farmer.id, status.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(project_id = id, farmer_id, status = %status, "Project status updated");

    Ok(Json(DataResponse {
        data: project_view(project, &farmer),
    }))
}

/// GET /api/v1/cooperative/farmers/{farmer_id}/projects/allocated-area
///
/// The farmer's current total allocated area.
pub async fn allocated_area(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(farmer_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AllocatedArea>>> {
    let cooperative_id = auth.require_cooperative(&state.pool).await?;
    let farmer = load_scoped_farmer(&state.pool, farmer_id, cooperative_id).await?;

    let allocated = ProjectRepo::sum_area_by_farmer(&state.pool, farmer.id).await?;

    Ok(Json(DataResponse {
        data: AllocatedArea {
            allocated_area: allocated,
        },
    }))
}
