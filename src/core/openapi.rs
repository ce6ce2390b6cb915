use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dto as admin_dto, handler as admin_handler};
use crate::features::applications::{
    dto as applications_dto, handler as applications_handler, model as applications_model,
};
use crate::features::attachments::{
    dto as attachments_dto, handler as attachments_handler, model as attachments_model,
};
use crate::features::auth::{dto as auth_dto, handler as auth_handler};
use crate::features::comments::{
    dto as comments_dto, handler as comments_handler, model as comments_model,
};
use crate::features::companies::{dto as companies_dto, handler as companies_handler};
use crate::features::notifications::{
    dto as notifications_dto, handler as notifications_handler, model as notifications_model,
};
use crate::features::projects::{
    dto as projects_dto, handler as projects_handler, model as projects_model,
};
use crate::features::tasks::{dto as tasks_dto, handler as tasks_handler, model as tasks_model};
use crate::features::users::{dto as users_dto, handler as users_handler, model as users_model};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handler::register,
        auth_handler::login,
        auth_handler::me,
        // Users
        users_handler::get_user,
        users_handler::update_me,
        // Companies
        companies_handler::get_company,
        // Projects
        projects_handler::create,
        projects_handler::list,
        projects_handler::get,
        projects_handler::update,
        projects_handler::update_status,
        projects_handler::delete,
        // Applications
        applications_handler::apply,
        applications_handler::list_for_project,
        applications_handler::list_mine,
        applications_handler::update_status,
        applications_handler::team,
        // Tasks
        tasks_handler::create,
        tasks_handler::list,
        tasks_handler::reorder,
        tasks_handler::update,
        tasks_handler::delete,
        tasks_handler::update_status,
        tasks_handler::assign,
        tasks_handler::add_checklist_item,
        tasks_handler::toggle_checklist_item,
        tasks_handler::remove_checklist_item,
        // Attachments
        attachments_handler::upload,
        attachments_handler::list,
        attachments_handler::delete,
        // Comments
        comments_handler::create,
        comments_handler::list,
        comments_handler::update,
        comments_handler::delete,
        // Notifications
        notifications_handler::list,
        notifications_handler::unread_count,
        notifications_handler::mark_read,
        notifications_handler::mark_all_read,
        notifications_handler::stream,
        // Admin
        admin_handler::list_users,
        admin_handler::ban_user,
        admin_handler::unban_user,
        admin_handler::set_user_active,
        admin_handler::soft_delete_project,
        admin_handler::restore_project,
        admin_handler::stats,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            users_model::UserRole,
            auth_dto::RegisterDto,
            auth_dto::LoginDto,
            auth_dto::AuthResponseDto,
            ApiResponse<auth_dto::AuthResponseDto>,
            // Users
            users_dto::UserResponseDto,
            users_dto::UpdateProfileDto,
            ApiResponse<users_dto::UserResponseDto>,
            ApiResponse<Vec<users_dto::UserResponseDto>>,
            // Companies
            companies_dto::CompanyResponseDto,
            ApiResponse<companies_dto::CompanyResponseDto>,
            // Projects
            projects_model::ProjectStatus,
            projects_dto::CreateProjectDto,
            projects_dto::UpdateProjectDto,
            projects_dto::UpdateProjectStatusDto,
            projects_dto::ProjectResponseDto,
            ApiResponse<projects_dto::ProjectResponseDto>,
            ApiResponse<Vec<projects_dto::ProjectResponseDto>>,
            // Applications
            applications_model::ApplicationStatus,
            applications_dto::CreateApplicationDto,
            applications_dto::UpdateApplicationStatusDto,
            applications_dto::ApplicationResponseDto,
            ApiResponse<applications_dto::ApplicationResponseDto>,
            ApiResponse<Vec<applications_dto::ApplicationResponseDto>>,
            // Tasks
            tasks_model::TaskStatus,
            tasks_model::ChecklistItem,
            tasks_dto::CreateTaskDto,
            tasks_dto::UpdateTaskDto,
            tasks_dto::UpdateTaskStatusDto,
            tasks_dto::AssignTaskDto,
            tasks_dto::AddChecklistItemDto,
            tasks_dto::ReorderTasksDto,
            tasks_dto::TaskResponseDto,
            ApiResponse<tasks_dto::TaskResponseDto>,
            ApiResponse<Vec<tasks_dto::TaskResponseDto>>,
            // Attachments
            attachments_model::ResourceType,
            attachments_dto::AttachmentResponseDto,
            attachments_dto::UploadOutcomeDto,
            ApiResponse<Vec<attachments_dto::AttachmentResponseDto>>,
            ApiResponse<Vec<attachments_dto::UploadOutcomeDto>>,
            // Comments
            comments_model::CommentResourceType,
            comments_dto::CreateCommentDto,
            comments_dto::UpdateCommentDto,
            comments_dto::CommentResponseDto,
            comments_dto::CommentThreadDto,
            ApiResponse<comments_dto::CommentResponseDto>,
            ApiResponse<Vec<comments_dto::CommentThreadDto>>,
            // Notifications
            notifications_model::NotificationKind,
            notifications_dto::NotificationDto,
            notifications_dto::UnreadCountDto,
            ApiResponse<notifications_dto::NotificationDto>,
            ApiResponse<Vec<notifications_dto::NotificationDto>>,
            ApiResponse<notifications_dto::UnreadCountDto>,
            // Admin
            admin_dto::SetUserActiveDto,
            admin_dto::UserCountsDto,
            admin_dto::ProjectCountsDto,
            admin_dto::AdminStatsDto,
            ApiResponse<admin_dto::AdminStatsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User profiles"),
        (name = "companies", description = "Company records"),
        (name = "projects", description = "Project lifecycle"),
        (name = "applications", description = "Freelancer applications and project teams"),
        (name = "tasks", description = "Project boards, checklists and assignments"),
        (name = "attachments", description = "File attachments on projects, tasks and profiles"),
        (name = "comments", description = "Comment threads on projects and tasks"),
        (name = "notifications", description = "In-app notifications and the SSE stream"),
        (name = "admin", description = "Moderation and platform statistics (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "LanceHub API",
        version = "0.1.0",
        description = "API documentation for LanceHub",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
