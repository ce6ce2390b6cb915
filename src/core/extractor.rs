use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// Pulls the authenticated user out of request extensions.
///
/// The auth middleware inserts it after verifying the bearer token, so a
/// missing extension means the route was mounted outside the protected
/// router.
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
