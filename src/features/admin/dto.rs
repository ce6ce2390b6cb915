use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::users::model::UserRole;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetUserActiveDto {
    pub is_active: bool,
}

/// Optional filters for the admin user listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserFilterQuery {
    pub role: Option<UserRole>,
    pub banned: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserCountsDto {
    pub total: i64,
    pub admins: i64,
    pub companies: i64,
    pub freelancers: i64,
    pub banned: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectCountsDto {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub closed: i64,
    pub deleted: i64,
}

/// Platform-wide counters for the admin dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStatsDto {
    pub users: UserCountsDto,
    pub projects: ProjectCountsDto,
    pub applications: i64,
    pub tasks: i64,
    pub comments: i64,
}
