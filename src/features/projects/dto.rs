use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::projects::model::{Project, ProjectStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 10000, message = "Description too long"))]
    pub description: String,

    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: f64,

    pub deadline: DateTime<Utc>,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget: Option<f64>,

    pub deadline: Option<DateTime<Utc>>,

    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectStatusDto {
    pub status: ProjectStatus,
}

/// Optional filters for the project listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProjectFilterQuery {
    /// Restrict to a single status
    pub status: Option<ProjectStatus>,
    /// Restrict to one company's projects
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
    pub created_by: Uuid,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponseDto {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            budget: p.budget,
            deadline: p.deadline,
            status: p.status,
            tags: p.tags.0,
            created_by: p.created_by,
            company_id: p.company_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
