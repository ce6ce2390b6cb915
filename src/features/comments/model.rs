use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// What a comment thread hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommentResourceType {
    Project,
    Task,
}

/// Database model for a comment.
///
/// `reply_to` is deliberately not a foreign key: deleting a comment leaves
/// its replies in place with a dangling reference.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
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
