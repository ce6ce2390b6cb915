use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::projects::handler;
use crate::features::projects::service::ProjectService;

pub fn routes(service: Arc<ProjectService>) -> Router {
    Router::new()
        .route("/api/projects", get(handler::list).post(handler::create))
        .route(
            "/api/projects/{id}",
            get(handler::get)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/api/projects/{id}/status", put(handler::update_status))
        .with_state(service)
}
