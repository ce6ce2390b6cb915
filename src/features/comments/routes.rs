use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::comments::handler;
use crate::features::comments::service::CommentService;

pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/comments/{resource_type}/{resource_id}",
            get(handler::list).post(handler::create),
        )
        .route(
            "/api/comments/{id}",
            put(handler::update).delete(handler::delete),
        )
        .with_state(service)
}
