use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::model::{Comment, CommentResourceType};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,

    /// Optional parent comment on the same resource
    pub reply_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentDto {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub resource_type: CommentResourceType,
    pub resource_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub reply_to: Option<Uuid>,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            resource_type: c.resource_type,
            resource_id: c.resource_id,
            author_id: c.author_id,
            content: c.content,
            reply_to: c.reply_to,
            edited: c.edited,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// A top-level comment with its direct replies
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentThreadDto {
    #[serde(flatten)]
    pub comment: CommentResponseDto,
    pub replies: Vec<CommentResponseDto>,
}
