use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::companies::handler;
use crate::features::companies::service::CompanyService;

pub fn routes(service: Arc<CompanyService>) -> Router {
    Router::new()
        .route("/api/companies/{id}", get(handler::get_company))
        .with_state(service)
}
