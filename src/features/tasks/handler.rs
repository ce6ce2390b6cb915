use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tasks::dto::{
    AddChecklistItemDto, AssignTaskDto, CreateTaskDto, ReorderTasksDto, TaskResponseDto,
    UpdateTaskDto, UpdateTaskStatusDto,
};
use crate::features::tasks::service::TaskService;
use crate::shared::types::ApiResponse;

/// Create a task on a project board
#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/tasks",
    params(("project_id" = Uuid, Path, description = "Project id")),
    request_body = CreateTaskDto,
    responses(
        (status = 201, description = "Task created", body = ApiResponse<TaskResponseDto>),
        (status = 403, description = "Not the owning company")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn create(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(project_id): Path<Uuid>,
    Json(dto): Json<CreateTaskDto>,
) -> Result<(StatusCode, Json<ApiResponse<TaskResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let task = service.create(user.id, project_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(task), None, None)),
    ))
}

/// List a project's tasks in board order
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/tasks",
    params(("project_id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Tasks", body = ApiResponse<Vec<TaskResponseDto>>),
        (status = 403, description = "Not a team member")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn list(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<TaskResponseDto>>>> {
    let tasks = service.list(user.id, project_id).await?;
    Ok(Json(ApiResponse::success(Some(tasks), None, None)))
}

/// Reorder a project's board
#[utoipa::path(
    put,
    path = "/api/projects/{project_id}/tasks/reorder",
    params(("project_id" = Uuid, Path, description = "Project id")),
    request_body = ReorderTasksDto,
    responses(
        (status = 200, description = "Board reordered", body = ApiResponse<Vec<TaskResponseDto>>),
        (status = 400, description = "Id set does not match the board")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn reorder(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(project_id): Path<Uuid>,
    Json(dto): Json<ReorderTasksDto>,
) -> Result<Json<ApiResponse<Vec<TaskResponseDto>>>> {
    let tasks = service.reorder(user.id, project_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(tasks), None, None)))
}

/// Update a task's details
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskDto,
    responses(
        (status = 200, description = "Task updated", body = ApiResponse<TaskResponseDto>),
        (status = 403, description = "Not the owner or assignee"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn update(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateTaskDto>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let task = service.update(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 403, description = "Not the owning company"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn delete(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Task deleted".to_string()),
        None,
    )))
}

/// Move a task to another status column
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/status",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<TaskResponseDto>),
        (status = 403, description = "Not the owner or assignee")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn update_status(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateTaskStatusDto>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    let task = service.update_status(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Assign a task to a team member (null clears)
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/assign",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = AssignTaskDto,
    responses(
        (status = 200, description = "Assignment changed", body = ApiResponse<TaskResponseDto>),
        (status = 400, description = "Assignee is not on the team"),
        (status = 403, description = "Not the owning company")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn assign(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<AssignTaskDto>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    let task = service.assign(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Add a checklist item to a task
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/checklist",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = AddChecklistItemDto,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<TaskResponseDto>),
        (status = 403, description = "Not the owner or assignee")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn add_checklist_item(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path(id): Path<Uuid>,
    Json(dto): Json<AddChecklistItemDto>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let task = service.add_checklist_item(user.id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Toggle a checklist item's completed flag
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/checklist/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Task id"),
        ("item_id" = Uuid, Path, description = "Checklist item id")
    ),
    responses(
        (status = 200, description = "Item toggled", body = ApiResponse<TaskResponseDto>),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn toggle_checklist_item(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    let task = service.toggle_checklist_item(user.id, id, item_id).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}

/// Remove a checklist item
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}/checklist/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Task id"),
        ("item_id" = Uuid, Path, description = "Checklist item id")
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<TaskResponseDto>),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn remove_checklist_item(
    user: AuthenticatedUser,
    State(service): State<Arc<TaskService>>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<TaskResponseDto>>> {
    let task = service.remove_checklist_item(user.id, id, item_id).await?;
    Ok(Json(ApiResponse::success(Some(task), None, None)))
}
