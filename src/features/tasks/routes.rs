use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::tasks::handler;
use crate::features::tasks::service::TaskService;

pub fn routes(service: Arc<TaskService>) -> Router {
    Router::new()
        .route(
            "/api/projects/{project_id}/tasks",
            get(handler::list).post(handler::create),
        )
        .route(
            "/api/projects/{project_id}/tasks/reorder",
            put(handler::reorder),
        )
        .route(
            "/api/tasks/{id}",
            put(handler::update).delete(handler::delete),
        )
        .route("/api/tasks/{id}/status", put(handler::update_status))
        .route("/api/tasks/{id}/assign", put(handler::assign))
        .route("/api/tasks/{id}/checklist", post(handler::add_checklist_item))
        .route(
            "/api/tasks/{id}/checklist/{item_id}",
            put(handler::toggle_checklist_item).delete(handler::remove_checklist_item),
        )
        .with_state(service)
}
