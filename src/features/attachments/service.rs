use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attachments::dto::{AttachmentResponseDto, UploadFile, UploadOutcomeDto};
use crate::features::attachments::model::{Attachment, ResourceType};
use crate::features::projects::service::{is_project_owner, is_team_member, load_project};
use crate::features::tasks::service::load_task;
use crate::features::users::model::User;
use crate::features::users::service::load_active_actor;
use crate::modules::storage::FileStore;

/// Service for file attachments on projects, tasks and profiles
pub struct AttachmentService {
    pool: SqlitePool,
    store: Arc<dyn FileStore>,
}

impl AttachmentService {
    pub fn new(pool: SqlitePool, store: Arc<dyn FileStore>) -> Self {
        Self { pool, store }
    }

    /// Whether the actor may attach files to the resource.
    ///
    /// Profiles accept uploads from their owner only; projects and tasks
    /// from any team member. Also verifies the resource exists.
    async fn assert_write_access(
        &self,
        actor: &User,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> Result<()> {
        match resource_type {
            ResourceType::Profile => {
                if actor.id != resource_id {
                    return Err(AppError::Forbidden(
                        "Cannot attach files to another user's profile".to_string(),
                    ));
                }
                Ok(())
            }
            ResourceType::Project => {
                let project = load_project(&self.pool, resource_id).await?;
                if !is_team_member(&self.pool, &project, actor).await? {
                    return Err(AppError::Forbidden(
                        "Only team members can attach files".to_string(),
                    ));
                }
                Ok(())
            }
            ResourceType::Task => {
                let task = load_task(&self.pool, resource_id).await?;
                let project = load_project(&self.pool, task.project_id).await?;
                if !is_team_member(&self.pool, &project, actor).await? {
                    return Err(AppError::Forbidden(
                        "Only team members can attach files".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Upload a batch of files to one resource.
    ///
    /// Each file is stored and recorded independently; failures are reported
    /// per file and do not abort the rest of the batch.
    pub async fn upload_many(
        &self,
        actor_id: Uuid,
        resource_type: ResourceType,
        resource_id: Uuid,
        files: Vec<UploadFile>,
    ) -> Result<Vec<UploadOutcomeDto>> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        self.assert_write_access(&actor, resource_type, resource_id)
            .await?;

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let outcome = match self
                .upload_one(&actor, resource_type, resource_id, &file)
                .await
            {
                Ok(attachment) => UploadOutcomeDto {
                    filename: file.filename,
                    success: true,
                    attachment: Some(attachment),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!("Upload of '{}' failed: {}", file.filename, e);
                    UploadOutcomeDto {
                        filename: file.filename,
                        success: false,
                        attachment: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn upload_one(
        &self,
        actor: &User,
        resource_type: ResourceType,
        resource_id: Uuid,
        file: &UploadFile,
    ) -> Result<AttachmentResponseDto> {
        let extension = file
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        let file_key = format!("{}/{}/{}.{}", resource_type, resource_id, Uuid::new_v4(), extension);

        let url = self
            .store
            .store(&file_key, file.data.clone(), &file.content_type)
            .await?;

        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments
                (id, resource_type, resource_id, filename, file_key, url, size, mimetype,
                 uploaded_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resource_type)
        .bind(resource_id)
        .bind(&file.filename)
        .bind(&file_key)
        .bind(&url)
        .bind(file.data.len() as i64)
        .bind(&file.content_type)
        .bind(actor.id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(attachment.into())
    }

    pub async fn list(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> Result<Vec<AttachmentResponseDto>> {
        let rows = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT * FROM attachments
            WHERE resource_type = ? AND resource_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(resource_type)
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|a| a.into()).collect())
    }

    /// Delete an attachment. The uploader may always delete their own; the
    /// owning company may delete anything on their project or its tasks.
    ///
    /// The database row goes first; a storage failure afterwards is logged
    /// and swallowed so the API stays consistent with the metadata.
    pub async fn delete(&self, actor_id: Uuid, id: Uuid) -> Result<()> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let attachment = sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attachment '{}' not found", id)))?;

        if attachment.uploaded_by != actor.id {
            let allowed = match attachment.resource_type {
                ResourceType::Profile => false,
                ResourceType::Project => {
                    let project = load_project(&self.pool, attachment.resource_id).await?;
                    is_project_owner(&project, &actor)
                }
                ResourceType::Task => {
                    let task = load_task(&self.pool, attachment.resource_id).await?;
                    let project = load_project(&self.pool, task.project_id).await?;
                    is_project_owner(&project, &actor)
                }
            };
            if !allowed {
                return Err(AppError::Forbidden(
                    "Not authorized to delete this attachment".to_string(),
                ));
            }
        }

        sqlx::query("DELETE FROM attachments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if let Err(e) = self.store.delete(&attachment.file_key).await {
            tracing::warn!(
                "Failed to delete stored file '{}': {}",
                attachment.file_key,
                e
            );
        }

        Ok(())
    }
}
