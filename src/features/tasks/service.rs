use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::model::NotificationKind;
use crate::features::notifications::NotificationService;
use crate::features::projects::model::Project;
use crate::features::projects::service::{
    assert_project_owner, is_project_owner, is_team_member, load_project,
};
use crate::features::tasks::dto::{
    AddChecklistItemDto, AssignTaskDto, CreateTaskDto, ReorderTasksDto, TaskResponseDto,
    UpdateTaskDto, UpdateTaskStatusDto,
};
use crate::features::tasks::model::{ChecklistItem, Task};
use crate::features::users::model::User;
use crate::features::users::service::{load_active_actor, load_user};
use crate::modules::storage::FileStore;

pub async fn load_task(pool: &SqlitePool, id: Uuid) -> Result<Task> {
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task '{}' not found", id)))
}

/// The project owner and the task's assignee may work a task.
fn assert_task_editor(project: &Project, task: &Task, user: &User) -> Result<()> {
    if is_project_owner(project, user) || task.assigned_to == Some(user.id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the project owner or the assignee can modify this task".to_string(),
    ))
}

/// Service for project board tasks
pub struct TaskService {
    pool: SqlitePool,
    notifications: Arc<NotificationService>,
    store: Arc<dyn FileStore>,
}

impl TaskService {
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

    pub async fn create(
        &self,
        actor_id: Uuid,
        project_id: Uuid,
        dto: CreateTaskDto,
    ) -> Result<TaskResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, project_id).await?;
        assert_project_owner(&project, &actor)?;

        // New tasks land at the end of the board. MAX keeps positions unique
        // even after mid-board deletes leave gaps.
        let position = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        let now = Utc::now();
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (id, project_id, title, description, status, due_date, assigned_to, checklist,
                 position, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'todo', ?, NULL, '[]', ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.due_date)
        .bind(position)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(task.into())
    }

    /// The project board, in position order. Team members only.
    pub async fn list(&self, actor_id: Uuid, project_id: Uuid) -> Result<Vec<TaskResponseDto>> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, project_id).await?;
        if !is_team_member(&self.pool, &project, &actor).await? {
            return Err(AppError::Forbidden(
                "Only team members can view the board".to_string(),
            ));
        }

        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE project_id = ? ORDER BY position",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks.into_iter().map(|t| t.into()).collect())
    }

    pub async fn update(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        dto: UpdateTaskDto,
    ) -> Result<TaskResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let task = load_task(&self.pool, task_id).await?;
        let project = load_project(&self.pool, task.project_id).await?;
        assert_project_owner(&project, &actor)?;

        let updated = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                due_date = COALESCE(?, due_date),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(dto.title)
        .bind(dto.description)
        .bind(dto.due_date)
        .bind(Utc::now())
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated.into())
    }

    /// Move a task to another column. Every transition is allowed, including
    /// pulling a finished task back to todo.
    pub async fn update_status(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        dto: UpdateTaskStatusDto,
    ) -> Result<TaskResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let task = load_task(&self.pool, task_id).await?;
        let project = load_project(&self.pool, task.project_id).await?;
        assert_task_editor(&project, &task, &actor)?;

        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(dto.status)
        .bind(Utc::now())
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated.into())
    }

    /// Assign the task to a team member, or clear the assignment.
    pub async fn assign(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        dto: AssignTaskDto,
    ) -> Result<TaskResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let task = load_task(&self.pool, task_id).await?;
        let project = load_project(&self.pool, task.project_id).await?;
        assert_project_owner(&project, &actor)?;

        if let Some(assignee_id) = dto.assigned_to {
            let assignee = load_user(&self.pool, assignee_id).await?;
            if !is_team_member(&self.pool, &project, &assignee).await? {
                return Err(AppError::Validation(
                    "Assignee is not a member of the project team".to_string(),
                ));
            }
        }

        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET assigned_to = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(dto.assigned_to)
        .bind(Utc::now())
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        // Every non-null assignment notifies, self-assignment included
        if let Some(assignee_id) = dto.assigned_to {
            self.notifications
                .notify(
                    assignee_id,
                    NotificationKind::TaskAssigned,
                    Some(task_id),
                    json!({
                        "taskTitle": updated.title,
                        "projectTitle": project.title,
                    }),
                )
                .await?;
        }

        Ok(updated.into())
    }

    pub async fn add_checklist_item(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        dto: AddChecklistItemDto,
    ) -> Result<TaskResponseDto> {
        self.mutate_checklist(actor_id, task_id, |items| {
            items.push(ChecklistItem {
                id: Uuid::new_v4(),
                text: dto.text.clone(),
                completed: false,
            });
            Ok(())
        })
        .await
    }

    pub async fn toggle_checklist_item(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        item_id: Uuid,
    ) -> Result<TaskResponseDto> {
        self.mutate_checklist(actor_id, task_id, |items| {
            let item = items
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Checklist item '{}' not found", item_id))
                })?;
            item.completed = !item.completed;
            Ok(())
        })
        .await
    }

    pub async fn remove_checklist_item(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        item_id: Uuid,
    ) -> Result<TaskResponseDto> {
        self.mutate_checklist(actor_id, task_id, |items| {
            let before = items.len();
            items.retain(|i| i.id != item_id);
            if items.len() == before {
                return Err(AppError::NotFound(format!(
                    "Checklist item '{}' not found",
                    item_id
                )));
            }
            Ok(())
        })
        .await
    }

    /// Load, mutate and write back the embedded checklist. Concurrent edits
    /// are last-write-wins.
    async fn mutate_checklist<F>(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        mutate: F,
    ) -> Result<TaskResponseDto>
    where
        F: FnOnce(&mut Vec<ChecklistItem>) -> Result<()>,
    {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let task = load_task(&self.pool, task_id).await?;
        let project = load_project(&self.pool, task.project_id).await?;
        assert_task_editor(&project, &task, &actor)?;

        let mut items = task.checklist.0;
        mutate(&mut items)?;

        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET checklist = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(Json(items))
        .bind(Utc::now())
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated.into())
    }

    /// Reorder the whole board. The submitted ids must be exactly the
    /// project's task ids, each once.
    pub async fn reorder(
        &self,
        actor_id: Uuid,
        project_id: Uuid,
        dto: ReorderTasksDto,
    ) -> Result<Vec<TaskResponseDto>> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let project = load_project(&self.pool, project_id).await?;
        assert_project_owner(&project, &actor)?;

        let existing =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM tasks WHERE project_id = ?")
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?;

        let submitted: HashSet<Uuid> = dto.task_ids.iter().copied().collect();
        let current: HashSet<Uuid> = existing.iter().copied().collect();
        if submitted.len() != dto.task_ids.len() || submitted != current {
            return Err(AppError::Validation(
                "Reorder must list every task of the project exactly once".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for (position, task_id) in dto.task_ids.iter().enumerate() {
            sqlx::query("UPDATE tasks SET position = ?, updated_at = ? WHERE id = ?")
                .bind(position as i64)
                .bind(now)
                .bind(task_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.list(actor_id, project_id).await
    }

    /// Delete a task and its comments and attachments. Stored files are
    /// removed after commit, best effort.
    pub async fn delete(&self, actor_id: Uuid, task_id: Uuid) -> Result<()> {
        let actor = load_active_actor(&self.pool, actor_id).await?;
        let task = load_task(&self.pool, task_id).await?;
        let project = load_project(&self.pool, task.project_id).await?;
        assert_project_owner(&project, &actor)?;

        let file_keys = sqlx::query_scalar::<_, String>(
            "SELECT file_key FROM attachments WHERE resource_type = 'task' AND resource_id = ?",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM comments WHERE resource_type = 'task' AND resource_id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM attachments WHERE resource_type = 'task' AND resource_id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        for key in file_keys {
            if let Err(e) = self.store.delete(&key).await {
                tracing::warn!("Failed to delete stored file '{}': {}", key, e);
            }
        }

        Ok(())
    }
}
