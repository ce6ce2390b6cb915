use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::admin::dto::{AdminStatsDto, SetUserActiveDto, UserFilterQuery};
use crate::features::admin::service::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::projects::dto::ProjectResponseDto;
use crate::features::users::dto::UserResponseDto;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List users with optional role and ban filters
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(filter): Query<UserFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (items, total) = service.list_users(&filter, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Ban a user
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/ban",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User banned", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Admin access required, or target is an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn ban_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.set_user_banned(id, true).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User banned".to_string()),
        None,
    )))
}

/// Lift a user's ban
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/unban",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User unbanned", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn unban_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.set_user_banned(id, false).await?;
    Ok(Json(ApiResponse::success(
        Some(user),
        Some("User unbanned".to_string()),
        None,
    )))
}

/// Activate or deactivate a user account
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/active",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SetUserActiveDto,
    responses(
        (status = 200, description = "Account flag changed", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Admin access required, or target is an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn set_user_active(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<SetUserActiveDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.set_user_active(id, dto.is_active).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

/// Soft-delete a project
#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project soft-deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn soft_delete_project(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.soft_delete_project(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Project soft-deleted".to_string()),
        None,
    )))
}

/// Restore a soft-deleted project
#[utoipa::path(
    put,
    path = "/api/admin/projects/{id}/restore",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project restored", body = ApiResponse<ProjectResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No soft-deleted project with this id")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn restore_project(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProjectResponseDto>>> {
    let project = service.restore_project(id).await?;
    Ok(Json(ApiResponse::success(Some(project), None, None)))
}

/// Platform-wide statistics
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<AdminStatsDto>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<AdminStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
