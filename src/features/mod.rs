pub mod admin;
pub mod applications;
pub mod attachments;
pub mod auth;
pub mod comments;
pub mod companies;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;

#[cfg(test)]
mod tests {
    //! End-to-end service flow across the whole marketplace.

    use std::sync::Arc;

    use crate::features::applications::dto::{CreateApplicationDto, UpdateApplicationStatusDto};
    use crate::features::applications::model::ApplicationStatus;
    use crate::features::applications::ApplicationService;
    use crate::features::auth::dto::RegisterDto;
    use crate::features::auth::AuthService;
    use crate::features::notifications::NotificationService;
    use crate::features::projects::dto::{CreateProjectDto, UpdateProjectStatusDto};
    use crate::features::projects::model::ProjectStatus;
    use crate::features::projects::ProjectService;
    use crate::features::tasks::dto::{
        AddChecklistItemDto, AssignTaskDto, CreateTaskDto, UpdateTaskStatusDto,
    };
    use crate::features::tasks::model::TaskStatus;
    use crate::features::tasks::TaskService;
    use crate::features::users::model::UserRole;
    use crate::modules::storage::memory::MemoryStore;
    use crate::shared::test_helpers::{setup_pool, test_token_service};
    use crate::shared::types::PaginationQuery;

    #[tokio::test]
    async fn full_marketplace_flow() {
        let pool = setup_pool().await;
        let store = Arc::new(MemoryStore::new());
        let notifications = Arc::new(NotificationService::new(pool.clone()));
        let auth = AuthService::new(pool.clone(), test_token_service());
        let projects = ProjectService::new(pool.clone(), notifications.clone(), store.clone());
        let applications = ApplicationService::new(pool.clone(), notifications.clone());
        let tasks = TaskService::new(pool.clone(), notifications.clone(), store.clone());

        // A company and a freelancer sign up
        let company = auth
            .register(RegisterDto {
                name: "Acme".to_string(),
                email: "acme@test.io".to_string(),
                password: "hunter2hunter2".to_string(),
                role: UserRole::Company,
            })
            .await
            .unwrap();
        let dev = auth
            .register(RegisterDto {
                name: "Dana".to_string(),
                email: "dana@test.io".to_string(),
                password: "hunter2hunter2".to_string(),
                role: UserRole::Freelancer,
            })
            .await
            .unwrap();

        // The company posts a project
        let project = projects
            .create(
                company.user.id,
                CreateProjectDto {
                    title: "Mobile app".to_string(),
                    description: "iOS and Android".to_string(),
                    budget: 9000.0,
                    deadline: chrono::Utc::now() + chrono::Duration::days(60),
                    tags: vec!["mobile".to_string()],
                },
            )
            .await
            .unwrap();

        // The freelancer applies and is accepted
        let application = applications
            .apply(
                dev.user.id,
                project.id,
                CreateApplicationDto {
                    cover_letter: "10 years of mobile work".to_string(),
                    proposed_budget: Some(8500.0),
                    estimated_duration: Some("8 weeks".to_string()),
                },
            )
            .await
            .unwrap();
        applications
            .update_status(
                company.user.id,
                application.id,
                UpdateApplicationStatusDto {
                    status: ApplicationStatus::Accepted,
                    feedback: None,
                },
            )
            .await
            .unwrap();

        let team = applications.team(dev.user.id, project.id).await.unwrap();
        assert_eq!(team.len(), 2);

        // A task is created, assigned, worked and finished
        let task = tasks
            .create(
                company.user.id,
                project.id,
                CreateTaskDto {
                    title: "Login screen".to_string(),
                    description: String::new(),
                    due_date: None,
                },
            )
            .await
            .unwrap();
        tasks
            .assign(
                company.user.id,
                task.id,
                AssignTaskDto {
                    assigned_to: Some(dev.user.id),
                },
            )
            .await
            .unwrap();
        let task = tasks
            .add_checklist_item(
                dev.user.id,
                task.id,
                AddChecklistItemDto {
                    text: "wire up OAuth".to_string(),
                },
            )
            .await
            .unwrap();
        tasks
            .toggle_checklist_item(dev.user.id, task.id, task.checklist[0].id)
            .await
            .unwrap();
        let finished = tasks
            .update_status(
                dev.user.id,
                task.id,
                UpdateTaskStatusDto {
                    status: TaskStatus::Done,
                },
            )
            .await
            .unwrap();
        assert_eq!(finished.status, TaskStatus::Done);

        // The company wraps the project up; the freelancer hears about it
        projects
            .update_status(
                company.user.id,
                project.id,
                UpdateProjectStatusDto {
                    status: ProjectStatus::Completed,
                },
            )
            .await
            .unwrap();

        let (inbox, total) = notifications
            .list(dev.user.id, &PaginationQuery::default())
            .await
            .unwrap();
        // Accepted application, task assignment, project completion
        assert_eq!(total, 3);
        assert!(inbox.iter().all(|n| !n.is_read));
    }
}
