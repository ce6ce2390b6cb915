use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::users::model::UserRole;

/// Identity injected by the auth middleware. Carries only what the token
/// proves; row-level state (banned, deactivated) is checked per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_company(&self) -> bool {
        self.role == UserRole::Company
    }

    pub fn is_freelancer(&self) -> bool {
        self.role == UserRole::Freelancer
    }
}

/// JWT claims for the bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub exp: usize,
}
