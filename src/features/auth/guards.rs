//! Role-based authorization guards.
//!
//! These guards extract the authenticated user and verify they have the
//! required role. Roles are flat: admin moderates, company owns projects,
//! freelancer applies and works on assigned tasks.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user))
    }
}

/// Guard for endpoints reserved to company accounts.
pub struct RequireCompany(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireCompany
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_company() {
            return Err(AppError::Forbidden(
                "Company account required".to_string(),
            ));
        }

        Ok(RequireCompany(user))
    }
}

/// Guard for endpoints reserved to freelancer accounts.
pub struct RequireFreelancer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireFreelancer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_freelancer() {
            return Err(AppError::Forbidden(
                "Freelancer account required".to_string(),
            ));
        }

        Ok(RequireFreelancer(user))
    }
}
