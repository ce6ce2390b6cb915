use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::applications::dto::{
    ApplicationResponseDto, CreateApplicationDto, UpdateApplicationStatusDto,
};
use crate::features::applications::model::{Application, ApplicationStatus};
use crate::features::notifications::model::{Notification, NotificationKind};
use crate::features::notifications::NotificationService;
use crate::features::projects::model::ProjectStatus;
use crate::features::projects::service::{assert_project_owner, load_project};
use crate::features::users::dto::UserResponseDto;
use crate::features::users::model::{User, UserRole};
use crate::features::users::service::load_active_actor;
use crate::shared::types::PaginationQuery;

/// Service for project applications and team membership
pub struct ApplicationService {
    pool: SqlitePool,
    notifications: Arc<NotificationService>,
}

impl ApplicationService {
    pub fn new(pool: SqlitePool, notifications: Arc<NotificationService>) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Apply to an open project. One application per freelancer per project.
    pub async fn apply(
        &self,
        actor_id: Uuid,
        project_id: Uuid,
        dto: CreateApplicationDto,
    ) -> Result<ApplicationResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        if actor.role != UserRole::Freelancer {
            return Err(AppError::Forbidden(
                "Only freelancers can apply to projects".to_string(),
            ));
        }

        let project = load_project(&self.pool, project_id).await?;
        if project.status != ProjectStatus::Open {
            return Err(AppError::InvalidState(
                "Project is not accepting applications".to_string(),
            ));
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM applications WHERE project_id = ? AND applicant_id = ?",
        )
        .bind(project_id)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await?;
        if existing > 0 {
            return Err(AppError::Conflict(
                "You have already applied to this project".to_string(),
            ));
        }

        let now = Utc::now();
        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
                (id, project_id, applicant_id, cover_letter, proposed_budget, estimated_duration,
                 status, feedback, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 'pending', NULL, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(actor.id)
        .bind(&dto.cover_letter)
        .bind(dto.proposed_budget)
        .bind(&dto.estimated_duration)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Application {} submitted by user {} for project {}",
            application.id,
            actor.id,
            project_id
        );
        Ok(application.into())
    }

    /// List applications for a project. Owning company only.
    pub async fn list_for_project(
        &self,
        actor_id: Uuid,
        project_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ApplicationResponseDto>, i64)> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, project_id).await?;
        assert_project_owner(&project, &actor)?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM applications WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE project_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(project_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(|a| a.into()).collect(), total))
    }

    /// List the current freelancer's own applications.
    pub async fn list_mine(
        &self,
        actor_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ApplicationResponseDto>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM applications WHERE applicant_id = ?",
        )
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE applicant_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(actor_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(|a| a.into()).collect(), total))
    }

    /// Accept or reject a pending application.
    ///
    /// Accepting adds the applicant to the project team and notifies them,
    /// all in one transaction. Setting the status it already has is a no-op;
    /// any other transition away from a settled status is rejected.
    pub async fn update_status(
        &self,
        actor_id: Uuid,
        application_id: Uuid,
        dto: UpdateApplicationStatusDto,
    ) -> Result<ApplicationResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let application = self.load(application_id).await?;
        let project = load_project(&self.pool, application.project_id).await?;
        assert_project_owner(&project, &actor)?;

        if application.status == dto.status {
            return Ok(application.into());
        }
        if application.status != ApplicationStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Application has already been {}",
                match application.status {
                    ApplicationStatus::Accepted => "accepted",
                    ApplicationStatus::Rejected => "rejected",
                    ApplicationStatus::Pending => "settled",
                }
            )));
        }
        if dto.status == ApplicationStatus::Pending {
            return Err(AppError::InvalidState(
                "Applications cannot be moved back to pending".to_string(),
            ));
        }

        let company_name =
            sqlx::query_scalar::<_, String>("SELECT name FROM companies WHERE id = ?")
                .bind(project.company_id)
                .fetch_one(&self.pool)
                .await?;

        let kind = match dto.status {
            ApplicationStatus::Accepted => NotificationKind::ApplicationAccepted,
            ApplicationStatus::Rejected => NotificationKind::ApplicationRejected,
            ApplicationStatus::Pending => unreachable!(),
        };
        let payload = json!({
            "projectTitle": project.title,
            "companyName": company_name,
            "feedback": dto.feedback,
        });

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Application>(
            "UPDATE applications SET status = ?, feedback = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(dto.status)
        .bind(&dto.feedback)
        .bind(Utc::now())
        .bind(application_id)
        .fetch_one(&mut *tx)
        .await?;

        if dto.status == ApplicationStatus::Accepted {
            sqlx::query(
                "INSERT OR IGNORE INTO project_members (project_id, user_id, added_at) VALUES (?, ?, ?)",
            )
            .bind(project.id)
            .bind(application.applicant_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        let notification = Notification::insert(
            &mut *tx,
            application.applicant_id,
            kind,
            Some(project.id),
            payload,
        )
        .await?;

        tx.commit().await?;

        self.notifications.push_best_effort(notification.into());

        Ok(updated.into())
    }

    /// The project team: the owning user plus every accepted freelancer.
    pub async fn team(&self, actor_id: Uuid, project_id: Uuid) -> Result<Vec<UserResponseDto>> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, project_id).await?;

        let is_member = crate::features::projects::service::is_team_member(
            &self.pool, &project, &actor,
        )
        .await?;
        if !is_member && actor.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Only team members can view the project team".to_string(),
            ));
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users WHERE id = ?
            UNION
            SELECT u.* FROM users u
            JOIN project_members m ON m.user_id = u.id
            WHERE m.project_id = ?
            "#,
        )
        .bind(project.created_by)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users.into_iter().map(|u| u.into()).collect())
    }

    async fn load(&self, id: Uuid) -> Result<Application> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application '{}' not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_project, create_user, setup_pool};

    fn sample_dto() -> CreateApplicationDto {
        CreateApplicationDto {
            cover_letter: "I can do this".to_string(),
            proposed_budget: Some(1800.0),
            estimated_duration: Some("3 weeks".to_string()),
        }
    }

    async fn setup() -> (SqlitePool, ApplicationService, Arc<NotificationService>) {
        let pool = setup_pool().await;
        let notifications = Arc::new(NotificationService::new(pool.clone()));
        let service = ApplicationService::new(pool.clone(), notifications.clone());
        (pool, service, notifications)
    }

    #[tokio::test]
    async fn duplicate_application_is_a_conflict() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        service.apply(dev.id, project.id, sample_dto()).await.unwrap();
        let err = service
            .apply(dev.id, project.id, sample_dto())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn closed_projects_reject_applications() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        sqlx::query("UPDATE projects SET status = 'closed' WHERE id = ?")
            .bind(project.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = service
            .apply(dev.id, project.id, sample_dto())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn companies_cannot_apply() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let other = create_user(&pool, "other@test.io", UserRole::Company).await;
        let project = create_project(&pool, &owner).await;

        let err = service
            .apply(other.id, project.id, sample_dto())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn accepting_adds_member_and_notifies_atomically() {
        let (pool, service, notifications) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        let application = service.apply(dev.id, project.id, sample_dto()).await.unwrap();
        let updated = service
            .update_status(
                owner.id,
                application.id,
                UpdateApplicationStatusDto {
                    status: ApplicationStatus::Accepted,
                    feedback: Some("Welcome aboard".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, ApplicationStatus::Accepted);

        let member = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM project_members WHERE project_id = ? AND user_id = ?",
        )
        .bind(project.id)
        .bind(dev.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(member, 1);

        let (items, _) = notifications
            .list(dev.id, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, NotificationKind::ApplicationAccepted);
        assert_eq!(items[0].payload["feedback"], "Welcome aboard");
    }

    #[tokio::test]
    async fn same_status_is_a_noop_and_resettling_fails() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        let application = service.apply(dev.id, project.id, sample_dto()).await.unwrap();
        service
            .update_status(
                owner.id,
                application.id,
                UpdateApplicationStatusDto {
                    status: ApplicationStatus::Rejected,
                    feedback: None,
                },
            )
            .await
            .unwrap();

        // Same status again: idempotent
        let again = service
            .update_status(
                owner.id,
                application.id,
                UpdateApplicationStatusDto {
                    status: ApplicationStatus::Rejected,
                    feedback: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(again.status, ApplicationStatus::Rejected);

        // Flipping a settled application is invalid
        let err = service
            .update_status(
                owner.id,
                application.id,
                UpdateApplicationStatusDto {
                    status: ApplicationStatus::Accepted,
                    feedback: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn only_owner_reviews_applications() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let rival = create_user(&pool, "rival@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        let application = service.apply(dev.id, project.id, sample_dto()).await.unwrap();

        let err = service
            .update_status(
                rival.id,
                application.id,
                UpdateApplicationStatusDto {
                    status: ApplicationStatus::Accepted,
                    feedback: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service
            .list_for_project(rival.id, project.id, &PaginationQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn team_lists_owner_and_accepted_members() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let outsider = create_user(&pool, "out@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        let application = service.apply(dev.id, project.id, sample_dto()).await.unwrap();
        service
            .update_status(
                owner.id,
                application.id,
                UpdateApplicationStatusDto {
                    status: ApplicationStatus::Accepted,
                    feedback: None,
                },
            )
            .await
            .unwrap();

        let team = service.team(dev.id, project.id).await.unwrap();
        let mut ids: Vec<Uuid> = team.iter().map(|u| u.id).collect();
        ids.sort();
        let mut expected = vec![owner.id, dev.id];
        expected.sort();
        assert_eq!(ids, expected);

        let err = service.team(outsider.id, project.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
