use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dto::{
    CommentResponseDto, CommentThreadDto, CreateCommentDto, UpdateCommentDto,
};
use crate::features::comments::model::CommentResourceType;
use crate::features::comments::service::CommentService;
use crate::shared::types::ApiResponse;

/// Comment on a project or task
#[utoipa::path(
    post,
    path = "/api/comments/{resource_type}/{resource_id}",
    params(
        ("resource_type" = CommentResourceType, Path, description = "project or task"),
        ("resource_id" = Uuid, Path, description = "Resource id")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Empty content or bad reply target"),
        (status = 404, description = "Resource not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn create(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path((resource_type, resource_id)): Path<(CommentResourceType, Uuid)>,
    Json(dto): Json<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service
        .create(user.id, resource_type, resource_id, dto)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment), None, None)),
    ))
}

/// List a resource's comment threads
#[utoipa::path(
    get,
    path = "/api/comments/{resource_type}/{resource_id}",
    params(
        ("resource_type" = CommentResourceType, Path, description = "project or task"),
        ("resource_id" = Uuid, Path, description = "Resource id")
    ),
    responses(
        (status = 200, description = "Comment threads", body = ApiResponse<Vec<CommentThreadDto>>)
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn list(
    _user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path((resource_type, resource_id)): Path<(CommentResourceType, Uuid)>,
) -> Result<Json<ApiResponse<Vec<CommentThreadDto>>>> {
    let threads = service.list(resource_type, resource_id).await?;
    Ok(Json(ApiResponse::success(Some(threads), None, None)))
}

/// Edit a comment (author only)
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment edited", body = ApiResponse<CommentResponseDto>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn update(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.update(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(comment), None, None)))
}

/// Delete a comment (author only; replies survive)
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn delete(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Comment deleted".to_string()),
        None,
    )))
}
