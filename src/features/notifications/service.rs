use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::dto::NotificationDto;
use crate::features::notifications::model::{Notification, NotificationKind};
use crate::shared::types::PaginationQuery;

/// Service for notification delivery.
///
/// The database is the source of truth; the broadcast channel is a
/// best-effort push side channel. Clients must always be able to rebuild
/// state from the pull API.
pub struct NotificationService {
    pool: SqlitePool,
    push: broadcast::Sender<NotificationDto>,
}

impl NotificationService {
    const PUSH_CAPACITY: usize = 256;

    pub fn new(pool: SqlitePool) -> Self {
        let (push, _) = broadcast::channel(Self::PUSH_CAPACITY);
        Self { pool, push }
    }

    /// Subscribe to the push channel (used by the SSE endpoint).
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationDto> {
        self.push.subscribe()
    }

    /// Create a notification and push it.
    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        entity_id: Option<Uuid>,
        payload: serde_json::Value,
    ) -> Result<NotificationDto> {
        let notification = Notification::insert(&self.pool, user_id, kind, entity_id, payload)
            .await
            .map_err(AppError::Database)?;

        let dto: NotificationDto = notification.into();
        self.push_best_effort(dto.clone());
        Ok(dto)
    }

    /// Fan out over the push channel. Never fails the calling operation.
    pub fn push_best_effort(&self, notification: NotificationDto) {
        if let Err(e) = self.push.send(notification) {
            // No subscribers, or all receivers dropped. Fine either way.
            tracing::debug!("Notification push skipped: {}", e);
        }
    }

    /// List a user's notifications, newest first.
    pub async fn list(
        &self,
        user_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<NotificationDto>, i64)> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(|n| n.into()).collect(), total))
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one notification read. Only the recipient may do this.
    pub async fn mark_read(&self, actor_id: Uuid, id: Uuid) -> Result<NotificationDto> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Notification '{}' not found", id)))?;

        if notification.user_id != actor_id {
            return Err(AppError::Forbidden(
                "Cannot mark another user's notification".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = 1 WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated.into())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<i64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        tracing::debug!(
            "Marked {} notifications read for user {} at {}",
            result.rows_affected(),
            user_id,
            Utc::now()
        );

        Ok(result.rows_affected() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::model::UserRole;
    use crate::shared::test_helpers::{create_user, setup_pool};
    use serde_json::json;

    #[tokio::test]
    async fn list_returns_newest_first() {
        let pool = setup_pool().await;
        let user = create_user(&pool, "notif@test.io", UserRole::Freelancer).await;
        let service = NotificationService::new(pool.clone());

        for i in 0..3 {
            Notification::insert(
                &pool,
                user.id,
                NotificationKind::ProjectUpdate,
                None,
                json!({ "seq": i }),
            )
            .await
            .unwrap();
            // created_at has second-level precision in RFC 3339; space them out
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let (items, total) = service
            .list(user.id, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(items[0].payload["seq"], 2);
        assert_eq!(items[2].payload["seq"], 0);
    }

    #[tokio::test]
    async fn mark_read_is_recipient_only() {
        let pool = setup_pool().await;
        let alice = create_user(&pool, "alice@test.io", UserRole::Freelancer).await;
        let bob = create_user(&pool, "bob@test.io", UserRole::Freelancer).await;
        let service = NotificationService::new(pool.clone());

        let n = service
            .notify(alice.id, NotificationKind::UserMention, None, json!({}))
            .await
            .unwrap();

        let err = service.mark_read(bob.id, n.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let read = service.mark_read(alice.id, n.id).await.unwrap();
        assert!(read.is_read);
        assert_eq!(service.unread_count(alice.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_all_read_clears_unread() {
        let pool = setup_pool().await;
        let user = create_user(&pool, "clear@test.io", UserRole::Company).await;
        let service = NotificationService::new(pool.clone());

        for _ in 0..4 {
            service
                .notify(user.id, NotificationKind::NewComment, None, json!({}))
                .await
                .unwrap();
        }

        assert_eq!(service.unread_count(user.id).await.unwrap(), 4);
        let affected = service.mark_all_read(user.id).await.unwrap();
        assert_eq!(affected, 4);
        assert_eq!(service.unread_count(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn push_channel_receives_notifications() {
        let pool = setup_pool().await;
        let user = create_user(&pool, "push@test.io", UserRole::Freelancer).await;
        let service = NotificationService::new(pool.clone());

        let mut rx = service.subscribe();
        service
            .notify(user.id, NotificationKind::TaskAssigned, None, json!({}))
            .await
            .unwrap();

        let pushed = rx.try_recv().unwrap();
        assert_eq!(pushed.user_id, user.id);
        assert_eq!(pushed.kind, NotificationKind::TaskAssigned);
    }

    #[tokio::test]
    async fn push_without_subscribers_does_not_fail() {
        let pool = setup_pool().await;
        let user = create_user(&pool, "nopush@test.io", UserRole::Freelancer).await;
        let service = NotificationService::new(pool.clone());

        // No subscriber exists; notify must still succeed.
        service
            .notify(user.id, NotificationKind::ProjectUpdate, None, json!({}))
            .await
            .unwrap();
        assert_eq!(service.unread_count(user.id).await.unwrap(), 1);
    }
}
