//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::features::auth::TokenService;
use crate::features::companies::service::ensure_company_for;
use crate::features::projects::model::Project;
use crate::features::users::model::{User, UserRole};

/// Fresh in-memory database with migrations applied.
///
/// A single connection is mandatory: every `:memory:` connection is its own
/// database, so a larger pool would scatter state.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

pub async fn create_user(pool: &SqlitePool, email: &str, role: UserRole) -> User {
    let now = Utc::now();
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, is_active, is_banned, created_at, updated_at)
        VALUES (?, ?, ?, 'unusable-test-hash', ?, 1, 0, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.split('@').next().unwrap_or("user"))
    .bind(email)
    .bind(role)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .expect("failed to insert test user")
}

/// Insert an open project owned by the given company user, backfilling
/// their company row when needed.
pub async fn create_project(pool: &SqlitePool, owner: &User) -> Project {
    // Reload so a previously backfilled company is reused
    let current = crate::features::users::service::load_user(pool, owner.id)
        .await
        .expect("owner must exist");
    let company_id = ensure_company_for(pool, &current)
        .await
        .expect("owner must be a company user");

    let now = Utc::now();
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects
            (id, title, description, budget, deadline, status, tags, created_by, company_id,
             is_deleted, created_at, updated_at)
        VALUES (?, 'Test Project', 'A project for tests', 1000.0, ?, 'open', '[]', ?, ?, 0, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(now + chrono::Duration::days(30))
    .bind(owner.id)
    .bind(company_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .expect("failed to insert test project")
}

pub async fn add_team_member(pool: &SqlitePool, project_id: Uuid, user_id: Uuid) {
    sqlx::query("INSERT INTO project_members (project_id, user_id, added_at) VALUES (?, ?, ?)")
        .bind(project_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("failed to insert test team member");
}

pub fn test_token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(AuthConfig {
        jwt_secret: "test-secret-at-least-16-chars".to_string(),
        token_ttl: Duration::from_secs(3600),
    }))
}
