use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dto::{
    AdminStatsDto, ProjectCountsDto, UserCountsDto, UserFilterQuery,
};
use crate::features::projects::dto::ProjectResponseDto;
use crate::features::projects::model::Project;
use crate::features::users::dto::UserResponseDto;
use crate::features::users::model::{User, UserRole};
use crate::features::users::service::load_user;
use crate::shared::types::PaginationQuery;

/// Service for platform moderation and statistics
pub struct AdminService {
    pool: SqlitePool,
}

impl AdminService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_users(
        &self,
        filter: &UserFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<UserResponseDto>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users
            WHERE (? IS NULL OR role = ?)
              AND (? IS NULL OR is_banned = ?)
            "#,
        )
        .bind(filter.role)
        .bind(filter.role)
        .bind(filter.banned)
        .bind(filter.banned)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE (? IS NULL OR role = ?)
              AND (? IS NULL OR is_banned = ?)
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(filter.role)
        .bind(filter.role)
        .bind(filter.banned)
        .bind(filter.banned)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(|u| u.into()).collect(), total))
    }

    /// Ban or unban a user. Banned users keep their data but are denied
    /// every write and cannot log in.
    pub async fn set_user_banned(&self, target_id: Uuid, banned: bool) -> Result<UserResponseDto> {
        let target = load_user(&self.pool, target_id).await?;
        if target.role == UserRole::Admin && banned {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be banned".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET is_banned = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(banned)
        .bind(Utc::now())
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "User {} {} by admin action",
            target_id,
            if banned { "banned" } else { "unbanned" }
        );
        Ok(updated.into())
    }

    pub async fn set_user_active(&self, target_id: Uuid, active: bool) -> Result<UserResponseDto> {
        let target = load_user(&self.pool, target_id).await?;
        if target.role == UserRole::Admin && !active {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be deactivated".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(active)
        .bind(Utc::now())
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated.into())
    }

    /// Soft-delete a project. It disappears from every listing but keeps
    /// its data for a later restore.
    pub async fn soft_delete_project(&self, project_id: Uuid) -> Result<()> {
        let affected = sqlx::query(
            "UPDATE projects SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0",
        )
        .bind(Utc::now())
        .bind(project_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound(format!(
                "Project '{}' not found",
                project_id
            )));
        }
        Ok(())
    }

    pub async fn restore_project(&self, project_id: Uuid) -> Result<ProjectResponseDto> {
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects SET is_deleted = 0, updated_at = ? WHERE id = ? AND is_deleted = 1 RETURNING *",
        )
        .bind(Utc::now())
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No soft-deleted project '{}'", project_id))
        })?;

        Ok(project.into())
    }

    pub async fn stats(&self) -> Result<AdminStatsDto> {
        let users = UserCountsDto {
            total: self.count("SELECT COUNT(*) FROM users").await?,
            admins: self
                .count("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .await?,
            companies: self
                .count("SELECT COUNT(*) FROM users WHERE role = 'company'")
                .await?,
            freelancers: self
                .count("SELECT COUNT(*) FROM users WHERE role = 'freelancer'")
                .await?,
            banned: self
                .count("SELECT COUNT(*) FROM users WHERE is_banned = 1")
                .await?,
        };

        let projects = ProjectCountsDto {
            total: self
                .count("SELECT COUNT(*) FROM projects WHERE is_deleted = 0")
                .await?,
            open: self
                .count("SELECT COUNT(*) FROM projects WHERE status = 'open' AND is_deleted = 0")
                .await?,
            in_progress: self
                .count(
                    "SELECT COUNT(*) FROM projects WHERE status = 'in_progress' AND is_deleted = 0",
                )
                .await?,
            completed: self
                .count(
                    "SELECT COUNT(*) FROM projects WHERE status = 'completed' AND is_deleted = 0",
                )
                .await?,
            closed: self
                .count("SELECT COUNT(*) FROM projects WHERE status = 'closed' AND is_deleted = 0")
                .await?,
            deleted: self
                .count("SELECT COUNT(*) FROM projects WHERE is_deleted = 1")
                .await?,
        };

        Ok(AdminStatsDto {
            users,
            projects,
            applications: self.count("SELECT COUNT(*) FROM applications").await?,
            tasks: self.count("SELECT COUNT(*) FROM tasks").await?,
            comments: self.count("SELECT COUNT(*) FROM comments").await?,
        })
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::service::load_active_actor;
    use crate::shared::test_helpers::{create_project, create_user, setup_pool};

    #[tokio::test]
    async fn admins_cannot_be_deactivated_or_banned() {
        let pool = setup_pool().await;
        let admin = create_user(&pool, "root@test.io", UserRole::Admin).await;
        let service = AdminService::new(pool.clone());

        let err = service.set_user_active(admin.id, false).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service.set_user_banned(admin.id, true).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // Reactivating an admin is a no-op, not an error
        service.set_user_active(admin.id, true).await.unwrap();
    }

    #[tokio::test]
    async fn banning_blocks_writes_until_unban() {
        let pool = setup_pool().await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let service = AdminService::new(pool.clone());

        service.set_user_banned(dev.id, true).await.unwrap();
        let err = load_active_actor(&pool, dev.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service.set_user_banned(dev.id, false).await.unwrap();
        load_active_actor(&pool, dev.id).await.unwrap();
    }

    #[tokio::test]
    async fn soft_delete_and_restore_round_trip() {
        let pool = setup_pool().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let project = create_project(&pool, &owner).await;
        let service = AdminService::new(pool.clone());

        service.soft_delete_project(project.id).await.unwrap();

        // A second soft delete finds nothing
        let err = service.soft_delete_project(project.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let restored = service.restore_project(project.id).await.unwrap();
        assert_eq!(restored.id, project.id);

        let err = service.restore_project(project.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn stats_count_by_role_and_status() {
        let pool = setup_pool().await;
        let service = AdminService::new(pool.clone());

        create_user(&pool, "root@test.io", UserRole::Admin).await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;
        sqlx::query("UPDATE projects SET status = 'in_progress' WHERE id = ?")
            .bind(project.id)
            .execute(&pool)
            .await
            .unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.users.total, 3);
        assert_eq!(stats.users.admins, 1);
        assert_eq!(stats.users.companies, 1);
        assert_eq!(stats.users.freelancers, 1);
        assert_eq!(stats.projects.total, 1);
        assert_eq!(stats.projects.in_progress, 1);
        assert_eq!(stats.projects.open, 0);
        assert_eq!(stats.applications, 0);
    }

    #[tokio::test]
    async fn user_listing_filters_by_role() {
        let pool = setup_pool().await;
        let service = AdminService::new(pool.clone());

        create_user(&pool, "a@test.io", UserRole::Company).await;
        create_user(&pool, "b@test.io", UserRole::Freelancer).await;
        create_user(&pool, "c@test.io", UserRole::Freelancer).await;

        let (items, total) = service
            .list_users(
                &UserFilterQuery {
                    role: Some(UserRole::Freelancer),
                    banned: None,
                },
                &PaginationQuery::default(),
            )
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(items.iter().all(|u| u.role == UserRole::Freelancer));
    }
}
