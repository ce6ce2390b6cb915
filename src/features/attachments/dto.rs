use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::attachments::model::{Attachment, ResourceType};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttachmentResponseDto {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub resource_id: Uuid,
    pub filename: String,
    pub url: String,
    pub size: i64,
    pub mimetype: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Attachment> for AttachmentResponseDto {
    fn from(a: Attachment) -> Self {
        Self {
            id: a.id,
            resource_type: a.resource_type,
            resource_id: a.resource_id,
            filename: a.filename,
            url: a.url,
            size: a.size,
            mimetype: a.mimetype,
            uploaded_by: a.uploaded_by,
            created_at: a.created_at,
        }
    }
}

/// One file extracted from the multipart body
#[derive(Debug)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Per-file result of a batch upload. One bad file never sinks the batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadOutcomeDto {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentResponseDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
