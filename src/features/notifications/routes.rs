use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::notifications::handler;
use crate::features::notifications::service::NotificationService;

pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/api/notifications", get(handler::list))
        .route("/api/notifications/unread-count", get(handler::unread_count))
        .route("/api/notifications/stream", get(handler::stream))
        .route("/api/notifications/read-all", put(handler::mark_all_read))
        .route("/api/notifications/{id}/read", put(handler::mark_read))
        .with_state(service)
}
