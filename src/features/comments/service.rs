use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::comments::dto::{
    CommentResponseDto, CommentThreadDto, CreateCommentDto, UpdateCommentDto,
};
use crate::features::comments::model::{Comment, CommentResourceType};
use crate::features::notifications::model::NotificationKind;
use crate::features::notifications::NotificationService;
use crate::features::projects::service::load_project;
use crate::features::tasks::service::load_task;
use crate::features::users::service::load_active_actor;

/// Service for comment threads on projects and tasks
pub struct CommentService {
    pool: SqlitePool,
    notifications: Arc<NotificationService>,
}

impl CommentService {
    pub fn new(pool: SqlitePool, notifications: Arc<NotificationService>) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Who gets told about a new comment: the task's assignee when there is
    /// one, otherwise the project owner.
    async fn comment_recipient(
        &self,
        resource_type: CommentResourceType,
        resource_id: Uuid,
    ) -> Result<Uuid> {
        match resource_type {
            CommentResourceType::Project => {
                let project = load_project(&self.pool, resource_id).await?;
                Ok(project.created_by)
            }
            CommentResourceType::Task => {
                let task = load_task(&self.pool, resource_id).await?;
                if let Some(assignee) = task.assigned_to {
                    return Ok(assignee);
                }
                let project = load_project(&self.pool, task.project_id).await?;
                Ok(project.created_by)
            }
        }
    }

    pub async fn create(
        &self,
        actor_id: Uuid,
        resource_type: CommentResourceType,
        resource_id: Uuid,
        dto: CreateCommentDto,
    ) -> Result<CommentResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;

        // Also verifies the resource exists
        let recipient = self.comment_recipient(resource_type, resource_id).await?;

        if let Some(parent_id) = dto.reply_to {
            let parent = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
                .bind(parent_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("Parent comment '{}' not found", parent_id))
                })?;
            if parent.resource_type != resource_type || parent.resource_id != resource_id {
                return Err(AppError::Validation(
                    "Replies must stay on the same resource as their parent".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments
                (id, resource_type, resource_id, author_id, content, reply_to, edited,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resource_type)
        .bind(resource_id)
        .bind(actor.id)
        .bind(&dto.content)
        .bind(dto.reply_to)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        if recipient != actor.id {
            self.notifications
                .notify(
                    recipient,
                    NotificationKind::NewComment,
                    Some(resource_id),
                    json!({
                        "authorName": actor.name,
                        "preview": dto.content.chars().take(120).collect::<String>(),
                    }),
                )
                .await?;
        }

        Ok(comment.into())
    }

    /// The resource's comments, grouped into threads: top-level comments
    /// newest first, each with its replies oldest first. Replies to replies
    /// are flattened into the same thread as their top-level ancestor.
    /// Replies whose parent was deleted surface as top-level, dangling
    /// reference intact.
    pub async fn list(
        &self,
        resource_type: CommentResourceType,
        resource_id: Uuid,
    ) -> Result<Vec<CommentThreadDto>> {
        let all = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM comments
            WHERE resource_type = ? AND resource_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(resource_type)
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        let parents: HashMap<Uuid, Option<Uuid>> =
            all.iter().map(|c| (c.id, c.reply_to)).collect();

        // Walk the reply chain up to the last comment that still exists.
        // A comment with no parent, or whose parent was deleted, is its
        // own root and shows top-level.
        let root_of = |id: Uuid| -> Uuid {
            let mut current = id;
            loop {
                match parents.get(&current).copied().flatten() {
                    Some(parent) if parents.contains_key(&parent) => current = parent,
                    _ => return current,
                }
            }
        };

        let mut threads: Vec<CommentThreadDto> = Vec::new();
        let mut index: HashMap<Uuid, usize> = HashMap::new();
        for comment in &all {
            if root_of(comment.id) == comment.id {
                index.insert(comment.id, threads.len());
                threads.push(CommentThreadDto {
                    comment: comment.clone().into(),
                    replies: Vec::new(),
                });
            }
        }
        for comment in all {
            let root = root_of(comment.id);
            if root != comment.id {
                if let Some(&at) = index.get(&root) {
                    threads[at].replies.push(comment.into());
                }
            }
        }

        // Input was oldest-first, so replies are already in order
        threads.reverse();
        Ok(threads)
    }

    pub async fn update(
        &self,
        actor_id: Uuid,
        id: Uuid,
        dto: UpdateCommentDto,
    ) -> Result<CommentResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let comment = self.load(id).await?;
        if comment.author_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the author can edit a comment".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = ?, edited = 1, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(&dto.content)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated.into())
    }

    /// Delete a comment. Replies are left in place.
    pub async fn delete(&self, actor_id: Uuid, id: Uuid) -> Result<()> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let comment = self.load(id).await?;
        if comment.author_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the author can delete a comment".to_string(),
            ));
        }

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Comment> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment '{}' not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::model::UserRole;
    use crate::shared::test_helpers::{create_project, create_user, setup_pool};

    async fn setup() -> (SqlitePool, CommentService, Arc<NotificationService>) {
        let pool = setup_pool().await;
        let notifications = Arc::new(NotificationService::new(pool.clone()));
        let service = CommentService::new(pool.clone(), notifications.clone());
        (pool, service, notifications)
    }

    fn dto(content: &str, reply_to: Option<Uuid>) -> CreateCommentDto {
        CreateCommentDto {
            content: content.to_string(),
            reply_to,
        }
    }

    #[tokio::test]
    async fn new_comment_notifies_the_project_owner() {
        let (pool, service, notifications) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        service
            .create(
                dev.id,
                CommentResourceType::Project,
                project.id,
                dto("looks great", None),
            )
            .await
            .unwrap();

        assert_eq!(notifications.unread_count(owner.id).await.unwrap(), 1);

        // Owner commenting on their own project stays silent
        service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("thanks", None),
            )
            .await
            .unwrap();
        assert_eq!(notifications.unread_count(owner.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn replies_cannot_cross_resources() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let project_a = create_project(&pool, &owner).await;
        let project_b = create_project(&pool, &owner).await;

        let parent = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project_a.id,
                dto("on a", None),
            )
            .await
            .unwrap();

        let err = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project_b.id,
                dto("reply from b", Some(parent.id)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn only_the_author_edits_or_deletes() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        let comment = service
            .create(
                dev.id,
                CommentResourceType::Project,
                project.id,
                dto("mine", None),
            )
            .await
            .unwrap();

        let err = service
            .update(
                owner.id,
                comment.id,
                UpdateCommentDto {
                    content: "hijacked".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service.delete(owner.id, comment.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let edited = service
            .update(
                dev.id,
                comment.id,
                UpdateCommentDto {
                    content: "revised".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(edited.edited);
        assert_eq!(edited.content, "revised");
    }

    #[tokio::test]
    async fn orphaned_replies_surface_top_level() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let project = create_project(&pool, &owner).await;

        let parent = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("parent", None),
            )
            .await
            .unwrap();
        let reply = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("reply", Some(parent.id)),
            )
            .await
            .unwrap();

        service.delete(owner.id, parent.id).await.unwrap();

        let threads = service
            .list(CommentResourceType::Project, project.id)
            .await
            .unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, reply.id);
        // The dangling reference is preserved
        assert_eq!(threads[0].comment.reply_to, Some(parent.id));
    }

    #[tokio::test]
    async fn replies_to_replies_stay_in_their_thread() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let dev = create_user(&pool, "dev@test.io", UserRole::Freelancer).await;
        let project = create_project(&pool, &owner).await;

        let top = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("kickoff", None),
            )
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let reply = service
            .create(
                dev.id,
                CommentResourceType::Project,
                project.id,
                dto("question", Some(top.id)),
            )
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let nested = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("answer", Some(reply.id)),
            )
            .await
            .unwrap();

        let threads = service
            .list(CommentResourceType::Project, project.id)
            .await
            .unwrap();

        // All three comments must appear, flattened into one thread
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, top.id);
        let reply_ids: Vec<Uuid> = threads[0].replies.iter().map(|r| r.id).collect();
        assert_eq!(reply_ids, vec![reply.id, nested.id]);
        // The nested reply keeps its direct parent reference
        assert_eq!(threads[0].replies[1].reply_to, Some(reply.id));
    }

    #[tokio::test]
    async fn threads_are_newest_first_with_replies_oldest_first() {
        let (pool, service, _) = setup().await;
        let owner = create_user(&pool, "co@test.io", UserRole::Company).await;
        let project = create_project(&pool, &owner).await;

        let first = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("first", None),
            )
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("second", None),
            )
            .await
            .unwrap();
        let reply_a = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("reply a", Some(first.id)),
            )
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let reply_b = service
            .create(
                owner.id,
                CommentResourceType::Project,
                project.id,
                dto("reply b", Some(first.id)),
            )
            .await
            .unwrap();

        let threads = service
            .list(CommentResourceType::Project, project.id)
            .await
            .unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, second.id);
        assert_eq!(threads[1].comment.id, first.id);
        assert_eq!(threads[1].replies[0].id, reply_a.id);
        assert_eq!(threads[1].replies[1].id, reply_b.id);
    }
}
