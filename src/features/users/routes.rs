use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::users::handler;
use crate::features::users::service::UserService;

/// Create routes for the users feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/me", put(handler::update_me))
        .route("/api/users/{id}", get(handler::get_user))
        .with_state(service)
}
