use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::applications::model::{Application, ApplicationStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateApplicationDto {
    #[serde(default)]
    #[validate(length(max = 5000, message = "Cover letter too long"))]
    pub cover_letter: String,

    #[validate(range(min = 0.0, message = "Proposed budget cannot be negative"))]
    pub proposed_budget: Option<f64>,

    #[validate(length(max = 100, message = "Estimated duration too long"))]
    pub estimated_duration: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateApplicationStatusDto {
    pub status: ApplicationStatus,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationResponseDto {
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

impl From<Application> for ApplicationResponseDto {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            project_id: a.project_id,
            applicant_id: a.applicant_id,
            cover_letter: a.cover_letter,
            proposed_budget: a.proposed_budget,
            estimated_duration: a.estimated_duration,
            status: a.status,
            feedback: a.feedback,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
