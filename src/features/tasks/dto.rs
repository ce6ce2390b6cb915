use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::tasks::model::{ChecklistItem, Task, TaskStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 10000, message = "Description too long"))]
    pub description: String,

    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description too long"))]
    pub description: Option<String>,

    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskStatusDto {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTaskDto {
    /// `null` clears the assignment
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddChecklistItemDto {
    #[validate(length(min = 1, max = 500, message = "Item text must be 1-500 characters"))]
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderTasksDto {
    /// Every task id of the project, in the desired board order
    pub task_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskResponseDto {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub checklist: Vec<ChecklistItem>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponseDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            project_id: t.project_id,
            title: t.title,
            description: t.description,
            status: t.status,
            due_date: t.due_date,
            assigned_to: t.assigned_to,
            checklist: t.checklist.0,
            position: t.position,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
