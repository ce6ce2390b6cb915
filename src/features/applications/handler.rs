use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::applications::dto::{
    ApplicationResponseDto, CreateApplicationDto, UpdateApplicationStatusDto,
};
use crate::features::applications::service::ApplicationService;
use crate::features::auth::guards::RequireFreelancer;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dto::UserResponseDto;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Apply to a project
#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/applications",
    params(("project_id" = Uuid, Path, description = "Project id")),
    request_body = CreateApplicationDto,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<ApplicationResponseDto>),
        (status = 403, description = "Not a freelancer account"),
        (status = 409, description = "Already applied"),
        (status = 422, description = "Project not accepting applications")
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn apply(
    RequireFreelancer(user): RequireFreelancer,
    State(service): State<Arc<ApplicationService>>,
    Path(project_id): Path<Uuid>,
    Json(dto): Json<CreateApplicationDto>,
) -> Result<(StatusCode, Json<ApiResponse<ApplicationResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let application = service.apply(user.id, project_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(application), None, None)),
    ))
}

/// List applications for a project (owning company only)
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/applications",
    params(("project_id" = Uuid, Path, description = "Project id"), PaginationQuery),
    responses(
        (status = 200, description = "Applications", body = ApiResponse<Vec<ApplicationResponseDto>>),
        (status = 403, description = "Not the owning company")
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn list_for_project(
    user: AuthenticatedUser,
    State(service): State<Arc<ApplicationService>>,
    Path(project_id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ApplicationResponseDto>>>> {
    let (items, total) = service
        .list_for_project(user.id, project_id, &pagination)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// List the current freelancer's own applications
#[utoipa::path(
    get,
    path = "/api/applications/mine",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Applications", body = ApiResponse<Vec<ApplicationResponseDto>>)
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn list_mine(
    RequireFreelancer(user): RequireFreelancer,
    State(service): State<Arc<ApplicationService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ApplicationResponseDto>>>> {
    let (items, total) = service.list_mine(user.id, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Accept or reject an application
#[utoipa::path(
    put,
    path = "/api/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application id")),
    request_body = UpdateApplicationStatusDto,
    responses(
        (status = 200, description = "Application updated", body = ApiResponse<ApplicationResponseDto>),
        (status = 403, description = "Not the owning company"),
        (status = 404, description = "Application not found"),
        (status = 422, description = "Application already settled")
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn update_status(
    user: AuthenticatedUser,
    State(service): State<Arc<ApplicationService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateApplicationStatusDto>,
) -> Result<Json<ApiResponse<ApplicationResponseDto>>> {
    let application = service.update_status(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(application), None, None)))
}

/// List the project team: owner plus accepted freelancers
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/team",
    params(("project_id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Team members", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 403, description = "Not a team member")
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn team(
    user: AuthenticatedUser,
    State(service): State<Arc<ApplicationService>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let members = service.team(user.id, project_id).await?;
    Ok(Json(ApiResponse::success(Some(members), None, None)))
}
