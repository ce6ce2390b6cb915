use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::dto::{UpdateProfileDto, UserResponseDto};
use crate::features::users::model::User;

/// Fetch a user by id, or NotFound.
pub async fn load_user(pool: &SqlitePool, id: Uuid) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", id)))
}

/// Fetch the acting user for a mutating operation.
///
/// Banned or deactivated actors are denied all writes regardless of role.
pub async fn load_active_actor(pool: &SqlitePool, id: Uuid) -> Result<User> {
    let user = load_user(pool, id).await?;

    if user.is_banned {
        return Err(AppError::Forbidden("Account is banned".to_string()));
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    Ok(user)
}

/// Service for user profile operations
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<UserResponseDto> {
        let user = load_user(&self.pool, id).await?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        actor_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<UserResponseDto> {
        let actor = load_active_actor(&self.pool, actor_id).await?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET name = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(&dto.name)
        .bind(Utc::now())
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user.into())
    }
}
