use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireCompany;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::projects::dto::{
    CreateProjectDto, ProjectFilterQuery, ProjectResponseDto, UpdateProjectDto,
    UpdateProjectStatusDto,
};
use crate::features::projects::service::ProjectService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Create a new project
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectDto,
    responses(
        (status = 201, description = "Project created", body = ApiResponse<ProjectResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not a company account")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn create(
    RequireCompany(user): RequireCompany,
    State(service): State<Arc<ProjectService>>,
    Json(dto): Json<CreateProjectDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let project = service.create(user.id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(project), None, None)),
    ))
}

/// List projects
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Projects", body = ApiResponse<Vec<ProjectResponseDto>>)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list(
    _user: AuthenticatedUser,
    State(service): State<Arc<ProjectService>>,
    Query(filter): Query<ProjectFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ProjectResponseDto>>>> {
    let (items, total) = service.list(&filter, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a single project
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ApiResponse<ProjectResponseDto>),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn get(
    _user: AuthenticatedUser,
    State(service): State<Arc<ProjectService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProjectResponseDto>>> {
    let project = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(project), None, None)))
}

/// Update a project's details
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = UpdateProjectDto,
    responses(
        (status = 200, description = "Project updated", body = ApiResponse<ProjectResponseDto>),
        (status = 403, description = "Not the owning company"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update(
    user: AuthenticatedUser,
    State(service): State<Arc<ProjectService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateProjectDto>,
) -> Result<Json<ApiResponse<ProjectResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let project = service.update(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(project), None, None)))
}

/// Change a project's status
#[utoipa::path(
    put,
    path = "/api/projects/{id}/status",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = UpdateProjectStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<ProjectResponseDto>),
        (status = 403, description = "Not the owning company"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_status(
    user: AuthenticatedUser,
    State(service): State<Arc<ProjectService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateProjectStatusDto>,
) -> Result<Json<ApiResponse<ProjectResponseDto>>> {
    let project = service.update_status(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(project), None, None)))
}

/// Delete a project and its tasks, applications, comments and attachments
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 403, description = "Not the owning company"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn delete(
    user: AuthenticatedUser,
    State(service): State<Arc<ProjectService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Project deleted".to_string()),
        None,
    )))
}
