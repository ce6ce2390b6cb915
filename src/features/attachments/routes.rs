use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::features::attachments::handler;
use crate::features::attachments::service::AttachmentService;

pub fn routes(service: Arc<AttachmentService>) -> Router {
    Router::new()
        .route(
            "/api/attachments/{resource_type}/{resource_id}",
            get(handler::list).post(handler::upload),
        )
        .route("/api/attachments/{id}", delete(handler::delete))
        .with_state(service)
}
