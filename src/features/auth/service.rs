use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dto::{AuthResponseDto, LoginDto, RegisterDto};
use crate::features::auth::token::TokenService;
use crate::features::users::dto::UserResponseDto;
use crate::features::users::model::{User, UserRole};

/// Service for registration and login
pub struct AuthService {
    pool: SqlitePool,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, tokens: Arc<TokenService>) -> Self {
        Self { pool, tokens }
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AppError::Internal("Failed to hash password".to_string()))
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn register(&self, dto: RegisterDto) -> Result<AuthResponseDto> {
        if dto.role == UserRole::Admin {
            return Err(AppError::Forbidden(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(&dto.email)
            .fetch_one(&self.pool)
            .await?;

        if existing > 0 {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = Self::hash_password(&dto.password)?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, is_active, is_banned, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(dto.role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("User registered: id={}, role={}", user.id, user.role);

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponseDto {
            token,
            user: user.into(),
        })
    }

    pub async fn login(&self, dto: LoginDto) -> Result<AuthResponseDto> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(&dto.email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !Self::verify_password(&dto.password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        if user.is_banned {
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }
        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponseDto {
            token,
            user: user.into(),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponseDto> {
        let user = crate::features::users::service::load_user(&self.pool, user_id).await?;
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup_pool, test_token_service};

    fn register_dto(email: &str, role: UserRole) -> RegisterDto {
        RegisterDto {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let pool = setup_pool().await;
        let service = AuthService::new(pool.clone(), test_token_service());

        let registered = service
            .register(register_dto("roundtrip@test.io", UserRole::Freelancer))
            .await
            .unwrap();
        assert_eq!(registered.user.role, UserRole::Freelancer);

        let logged_in = service
            .login(LoginDto {
                email: "roundtrip@test.io".to_string(),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let pool = setup_pool().await;
        let service = AuthService::new(pool.clone(), test_token_service());

        service
            .register(register_dto("dup@test.io", UserRole::Company))
            .await
            .unwrap();
        let err = service
            .register(register_dto("dup@test.io", UserRole::Freelancer))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let pool = setup_pool().await;
        let service = AuthService::new(pool.clone(), test_token_service());

        service
            .register(register_dto("pw@test.io", UserRole::Freelancer))
            .await
            .unwrap();

        let err = service
            .login(LoginDto {
                email: "pw@test.io".to_string(),
                password: "not-the-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn banned_user_cannot_login() {
        let pool = setup_pool().await;
        let service = AuthService::new(pool.clone(), test_token_service());

        let registered = service
            .register(register_dto("banned-login@test.io", UserRole::Freelancer))
            .await
            .unwrap();

        sqlx::query("UPDATE users SET is_banned = 1 WHERE id = ?")
            .bind(registered.user.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = service
            .login(LoginDto {
                email: "banned-login@test.io".to_string(),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_registration_is_refused() {
        let pool = setup_pool().await;
        let service = AuthService::new(pool.clone(), test_token_service());

        let err = service
            .register(register_dto("sneaky@test.io", UserRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
