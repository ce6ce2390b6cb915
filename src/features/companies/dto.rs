use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::companies::model::Company;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponseDto {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponseDto {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            name: c.name,
            created_at: c.created_at,
        }
    }
}
