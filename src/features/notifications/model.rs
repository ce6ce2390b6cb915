use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// What happened. Stored as text, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    ApplicationAccepted,
    ApplicationRejected,
    NewComment,
    ProjectUpdate,
    UserMention,
}

/// Database model for a notification
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub entity_id: Option<Uuid>,
    pub payload: Json<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Insert a notification row.
    ///
    /// Takes any executor so callers can fold the insert into their own
    /// transaction when the notification must land atomically with the
    /// triggering write.
    pub async fn insert<'e, E>(
        executor: E,
        user_id: Uuid,
        kind: NotificationKind,
        entity_id: Option<Uuid>,
        payload: serde_json::Value,
    ) -> sqlx::Result<Notification>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, kind, entity_id, payload, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(kind)
        .bind(entity_id)
        .bind(Json(payload))
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }
}
