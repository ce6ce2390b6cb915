use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dto::{UpdateProfileDto, UserResponseDto};
use crate::features::users::service::UserService;
use crate::shared::types::ApiResponse;

/// Get a user's profile
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = ApiResponse<UserResponseDto>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    _user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.get_profile(id).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_me(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Json(dto): Json<UpdateProfileDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = service.update_profile(user.id, dto).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}
