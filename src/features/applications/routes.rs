use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::applications::handler;
use crate::features::applications::service::ApplicationService;

pub fn routes(service: Arc<ApplicationService>) -> Router {
    Router::new()
        .route(
            "/api/projects/{project_id}/applications",
            get(handler::list_for_project).post(handler::apply),
        )
        .route("/api/projects/{project_id}/team", get(handler::team))
        .route("/api/applications/mine", get(handler::list_mine))
        .route("/api/applications/{id}/status", put(handler::update_status))
        .with_state(service)
}
