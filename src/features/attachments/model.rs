use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// What an attachment hangs off. Rows are cleaned up by the owning feature
/// when the resource goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Project,
    Task,
    Profile,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Project => write!(f, "project"),
            ResourceType::Task => write!(f, "task"),
            ResourceType::Profile => write!(f, "profile"),
        }
    }
}

/// Database model for an uploaded file
#[derive(Debug, Clone, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub resource_id: Uuid,
    pub filename: String,
    pub file_key: String,
    pub url: String,
    pub size: i64,
    pub mimetype: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}
