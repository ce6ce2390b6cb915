use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Database model for a freelancer's application to a project
#[derive(Debug, Clone, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub project_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: String,
    pub proposed_budget: Option<f64>,
    pub estimated_duration: Option<String>,
    pub status: ApplicationStatus,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
