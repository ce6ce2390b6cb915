use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attachments::dto::{AttachmentResponseDto, UploadFile, UploadOutcomeDto};
use crate::features::attachments::model::ResourceType;
use crate::features::attachments::service::AttachmentService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{is_mime_type_allowed, ALLOWED_MIME_TYPES, MAX_FILE_SIZE};
use crate::shared::types::ApiResponse;

/// Upload one or more files to a resource
///
/// Accepts multipart/form-data; every `file` field becomes one attachment.
/// Files are processed independently and each gets its own outcome in the
/// response.
#[utoipa::path(
    post,
    path = "/api/attachments/{resource_type}/{resource_id}",
    params(
        ("resource_type" = ResourceType, Path, description = "project, task or profile"),
        ("resource_id" = Uuid, Path, description = "Resource id")
    ),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Per-file upload outcomes", body = ApiResponse<Vec<UploadOutcomeDto>>),
        (status = 400, description = "No files, file too large, or type not allowed"),
        (status = 403, description = "No write access to the resource")
    ),
    security(("bearer_auth" = [])),
    tag = "attachments"
)]
pub async fn upload(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path((resource_type, resource_id)): Path<(ResourceType, Uuid)>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<UploadOutcomeDto>>>)> {
    let mut files: Vec<UploadFile> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "file" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::BadRequest(format!(
                "File '{}' too large. Maximum size is {} bytes ({} MB)",
                filename,
                MAX_FILE_SIZE,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        if !is_mime_type_allowed(&content_type) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                content_type,
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }

        files.push(UploadFile {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest(
            "At least one file is required".to_string(),
        ));
    }

    let outcomes = service
        .upload_many(user.id, resource_type, resource_id, files)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(outcomes), None, None)),
    ))
}

/// List a resource's attachments
#[utoipa::path(
    get,
    path = "/api/attachments/{resource_type}/{resource_id}",
    params(
        ("resource_type" = ResourceType, Path, description = "project, task or profile"),
        ("resource_id" = Uuid, Path, description = "Resource id")
    ),
    responses(
        (status = 200, description = "Attachments", body = ApiResponse<Vec<AttachmentResponseDto>>)
    ),
    security(("bearer_auth" = [])),
    tag = "attachments"
)]
pub async fn list(
    _user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path((resource_type, resource_id)): Path<(ResourceType, Uuid)>,
) -> Result<Json<ApiResponse<Vec<AttachmentResponseDto>>>> {
    let attachments = service.list(resource_type, resource_id).await?;
    Ok(Json(ApiResponse::success(Some(attachments), None, None)))
}

/// Delete an attachment
#[utoipa::path(
    delete,
    path = "/api/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Attachment deleted"),
        (status = 403, description = "Not the uploader or owning company"),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "attachments"
)]
pub async fn delete(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Attachment deleted".to_string()),
        None,
    )))
}
