use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::companies::service::ensure_company_for;
use crate::features::notifications::model::NotificationKind;
use crate::features::notifications::NotificationService;
use crate::features::projects::dto::{
    CreateProjectDto, ProjectFilterQuery, ProjectResponseDto, UpdateProjectDto,
    UpdateProjectStatusDto,
};
use crate::features::projects::model::{Project, ProjectStatus};
use crate::features::users::model::User;
use crate::features::users::service::load_active_actor;
use crate::modules::storage::FileStore;
use crate::shared::types::PaginationQuery;

/// Fetch a project by id, hiding soft-deleted rows.
pub async fn load_project(pool: &SqlitePool, id: Uuid) -> Result<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND is_deleted = 0")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project '{}' not found", id)))
}

/// Whether the user owns the project: its creator, or any user of the
/// owning company.
pub fn is_project_owner(project: &Project, user: &User) -> bool {
    project.created_by == user.id || user.company_id == Some(project.company_id)
}

pub fn assert_project_owner(project: &Project, user: &User) -> Result<()> {
    if is_project_owner(project, user) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the owning company can modify this project".to_string(),
    ))
}

/// Whether the user may work on the project: its owner, or a freelancer
/// whose application was accepted.
pub async fn is_team_member(pool: &SqlitePool, project: &Project, user: &User) -> Result<bool> {
    if is_project_owner(project, user) {
        return Ok(true);
    }

    let member = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM project_members WHERE project_id = ? AND user_id = ?",
    )
    .bind(project.id)
    .bind(user.id)
    .fetch_one(pool)
    .await?;

    Ok(member > 0)
}

/// Service for project lifecycle operations
pub struct ProjectService {
    pool: SqlitePool,
    notifications: Arc<NotificationService>,
    store: Arc<dyn FileStore>,
}

impl ProjectService {
    pub fn new(
        pool: SqlitePool,
        notifications: Arc<NotificationService>,
        store: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            pool,
            notifications,
            store,
        }
    }

    pub async fn create(&self, actor_id: Uuid, dto: CreateProjectDto) -> Result<ProjectResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let company_id = ensure_company_for(&self.pool, &actor).await?;

        let now = Utc::now();
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (id, title, description, budget, deadline, status, tags, created_by, company_id,
                 is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'open', ?, ?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.budget)
        .bind(dto.deadline)
        .bind(Json(dto.tags))
        .bind(actor.id)
        .bind(company_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Project {} created by user {}", project.id, actor.id);
        Ok(project.into())
    }

    pub async fn list(
        &self,
        filter: &ProjectFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ProjectResponseDto>, i64)> {
        // Both filters are optional; a NULL bind disables its clause.
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM projects
            WHERE is_deleted = 0
              AND (? IS NULL OR status = ?)
              AND (? IS NULL OR company_id = ?)
            "#,
        )
        .bind(filter.status)
        .bind(filter.status)
        .bind(filter.company_id)
        .bind(filter.company_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE is_deleted = 0
              AND (? IS NULL OR status = ?)
              AND (? IS NULL OR company_id = ?)
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(filter.status)
        .bind(filter.status)
        .bind(filter.company_id)
        .bind(filter.company_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(|p| p.into()).collect(), total))
    }

    pub async fn get(&self, id: Uuid) -> Result<ProjectResponseDto> {
        let project = load_project(&self.pool, id).await?;
        Ok(project.into())
    }

    pub async fn update(
        &self,
        actor_id: Uuid,
        id: Uuid,
        dto: UpdateProjectDto,
    ) -> Result<ProjectResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, id).await?;
        assert_project_owner(&project, &actor)?;

        let updated = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                budget = COALESCE(?, budget),
                deadline = COALESCE(?, deadline),
                tags = COALESCE(?, tags),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(dto.title)
        .bind(dto.description)
        .bind(dto.budget)
        .bind(dto.deadline)
        .bind(dto.tags.map(Json))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated.into())
    }

    /// Change the project status. Any transition is allowed; closing a
    /// project simply stops new applications.
    pub async fn update_status(
        &self,
        actor_id: Uuid,
        id: Uuid,
        dto: UpdateProjectStatusDto,
    ) -> Result<ProjectResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, id).await?;
        assert_project_owner(&project, &actor)?;

        let updated = sqlx::query_as::<_, Project>(
            "UPDATE projects SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(dto.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        self.notify_team(&updated, dto.status).await?;

        Ok(updated.into())
    }

    async fn notify_team(&self, project: &Project, status: ProjectStatus) -> Result<()> {
        let members = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM project_members WHERE project_id = ?",
        )
        .bind(project.id)
        .fetch_all(&self.pool)
        .await?;

        for member in members {
            self.notifications
                .notify(
                    member,
                    NotificationKind::ProjectUpdate,
                    Some(project.id),
                    json!({
                        "projectTitle": project.title,
                        "status": status,
                    }),
                )
                .await?;
        }
        Ok(())
    }

    /// Delete a project and everything hanging off it.
    ///
    /// Tasks, applications and team memberships cascade in the database;
    /// comments and attachments are keyed polymorphically and are removed
    /// here. Stored files are deleted after commit, best effort.
    pub async fn delete(&self, actor_id: Uuid, id: Uuid) -> Result<()> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, id).await?;
        assert_project_owner(&project, &actor)?;

        let file_keys = sqlx::query_scalar::<_, String>(
            r#"
            SELECT file_key FROM attachments
            WHERE (resource_type = 'project' AND resource_id = ?)
               OR (resource_type = 'task' AND resource_id IN
                   (SELECT id FROM tasks WHERE project_id = ?))
            "#,
        )
        .bind(id)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM comments
            WHERE (resource_type = 'project' AND resource_id = ?)
               OR (resource_type = 'task' AND resource_id IN
                   (SELECT id FROM tasks WHERE project_id = ?))
            "#,
        )
        .bind(id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM attachments
            WHERE (resource_type = 'project' AND resource_id = ?)
               OR (resource_type = 'task' AND resource_id IN
                   (SELECT id FROM tasks WHERE project_id = ?))
            "#,
        )
        .bind(id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        for key in file_keys {
            if let Err(e) = self.store.delete(&key).await {
                tracing::warn!("Failed to delete stored file '{}': {}", key, e);
            }
        }

        tracing::info!("Project {} deleted by user {}", id, actor.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::model::UserRole;
    use crate::features::users::service::load_user;
    use crate::modules::storage::memory::MemoryStore;
    use crate::shared::test_helpers::{create_project, create_user, setup_pool};

    fn service(pool: &SqlitePool) -> ProjectService {
        ProjectService::new(
            pool.clone(),
            Arc::new(NotificationService::new(pool.clone())),
            Arc::new(MemoryStore::new()),
        )
    }

    fn sample_dto() -> CreateProjectDto {
        CreateProjectDto {
            title: "Build a website".to_string(),
            description: "Marketing site".to_string(),
            budget: 2500.0,
            deadline: Utc::now() + chrono::Duration::days(30),
            tags: vec!["web".to_string(), "design".to_string()],
        }
    }

    #[tokio::test]
    async fn create_assigns_owning_company() {
        let pool = setup_pool().await;
        let company_user = create_user(&pool, "owner@test.io", UserRole::Company).await;
        let service = service(&pool);

        let project = service.create(company_user.id, sample_dto()).await.unwrap();

        // Company was backfilled lazily and stamped onto the project
        let reloaded = load_user(&pool, company_user.id).await.unwrap();
        assert_eq!(Some(project.company_id), reloaded.company_id);
        assert_eq!(project.status, ProjectStatus::Open);
        assert_eq!(project.tags, vec!["web", "design"]);
    }

    #[tokio::test]
    async fn freelancers_cannot_create_projects() {
        let pool = setup_pool().await;
        let freelancer = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let service = service(&pool);

        let err = service.create(freelancer.id, sample_dto()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn only_owner_can_update() {
        let pool = setup_pool().await;
        let owner = create_user(&pool, "a@test.io", UserRole::Company).await;
        let other = create_user(&pool, "b@test.io", UserRole::Company).await;
        let service = service(&pool);

        let project = service.create(owner.id, sample_dto()).await.unwrap();

        let err = service
            .update(
                other.id,
                project.id,
                UpdateProjectDto {
                    title: Some("Hijacked".to_string()),
                    description: None,
                    budget: None,
                    deadline: None,
                    tags: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn soft_deleted_projects_are_hidden() {
        let pool = setup_pool().await;
        let owner = create_user(&pool, "hide@test.io", UserRole::Company).await;
        let service = service(&pool);

        let project = service.create(owner.id, sample_dto()).await.unwrap();
        sqlx::query("UPDATE projects SET is_deleted = 1 WHERE id = ?")
            .bind(project.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = service.get(project.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let (items, total) = service
            .list(&ProjectFilterQuery::default(), &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 0);
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn status_change_notifies_team_members() {
        let pool = setup_pool().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "member@test.io", UserRole::Freelancer).await;
        let notifications = Arc::new(NotificationService::new(pool.clone()));
        let service = ProjectService::new(
            pool.clone(),
            notifications.clone(),
            Arc::new(MemoryStore::new()),
        );

        let project = service.create(owner.id, sample_dto()).await.unwrap();
        sqlx::query("INSERT INTO project_members (project_id, user_id, added_at) VALUES (?, ?, ?)")
            .bind(project.id)
            .bind(dev.id)
            .bind(Utc::now())
            .execute(&pool)
            .await
            .unwrap();

        service
            .update_status(
                owner.id,
                project.id,
                UpdateProjectStatusDto {
                    status: ProjectStatus::InProgress,
                },
            )
            .await
            .unwrap();

        assert_eq!(notifications.unread_count(dev.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_dependents_and_files() {
        let pool = setup_pool().await;
        let owner = create_user(&pool, "del@test.io", UserRole::Company).await;
        let store = Arc::new(MemoryStore::new());
        let service = ProjectService::new(
            pool.clone(),
            Arc::new(NotificationService::new(pool.clone())),
            store.clone(),
        );

        let project = service.create(owner.id, sample_dto()).await.unwrap();
        let _other = create_project(&pool, &load_user(&pool, owner.id).await.unwrap()).await;

        // Attach a stored file and a comment to the project
        store
            .store("project/key-1", b"data".to_vec(), "text/plain")
            .await
            .unwrap();
        sqlx::query(
            r#"
            INSERT INTO attachments
                (id, resource_type, resource_id, filename, file_key, url, size, mimetype,
                 uploaded_by, created_at)
            VALUES (?, 'project', ?, 'a.txt', 'project/key-1', 'memory://project/key-1', 4,
                    'text/plain', ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project.id)
        .bind(owner.id)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            r#"
            INSERT INTO comments
                (id, resource_type, resource_id, author_id, content, reply_to, edited,
                 created_at, updated_at)
            VALUES (?, 'project', ?, ?, 'hello', NULL, 0, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project.id)
        .bind(owner.id)
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        service.delete(owner.id, project.id).await.unwrap();

        let comments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
            .fetch_one(&pool)
            .await
            .unwrap();
        let attachments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attachments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(comments, 0);
        assert_eq!(attachments, 0);
        assert!(!store.contains("project/key-1"));

        // The unrelated project survives
        let (_, total) = service
            .list(&ProjectFilterQuery::default(), &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
    }
}
