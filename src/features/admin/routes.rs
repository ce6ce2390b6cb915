use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::features::admin::handler;
use crate::features::admin::service::AdminService;

pub fn routes(service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/api/admin/users", get(handler::list_users))
        .route("/api/admin/users/{id}/ban", put(handler::ban_user))
        .route("/api/admin/users/{id}/unban", put(handler::unban_user))
        .route("/api/admin/users/{id}/active", put(handler::set_user_active))
        .route(
            "/api/admin/projects/{id}",
            delete(handler::soft_delete_project),
        )
        .route(
            "/api/admin/projects/{id}/restore",
            put(handler::restore_project),
        )
        .route("/api/admin/stats", get(handler::stats))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::users::model::UserRole;
    use crate::shared::test_helpers::{create_user, setup_pool};
    use axum::http::StatusCode;
    use axum::Extension;
    use axum_test::TestServer;

    #[tokio::test]
    async fn non_admins_are_rejected_at_the_route() {
        let pool = setup_pool().await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let service = Arc::new(AdminService::new(pool));

        let app = routes(service).layer(Extension(AuthenticatedUser {
            id: dev.id,
            role: dev.role,
        }));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/admin/stats").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admins_get_stats() {
        let pool = setup_pool().await;
        let admin = create_user(&pool, "root@test.io", UserRole::Admin).await;
        let service = Arc::new(AdminService::new(pool));

        let app = routes(service).layer(Extension(AuthenticatedUser {
            id: admin.id,
            role: admin.role,
        }));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/admin/stats").await;
        response.assert_status_ok();
    }
}
