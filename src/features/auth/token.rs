use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Claims};
use crate::features::users::model::User;

/// Issues and verifies HS256 bearer tokens.
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(
                chrono::Duration::from_std(self.config.token_ttl)
                    .map_err(|e| AppError::Internal(format!("Invalid token TTL: {}", e)))?,
            )
            .ok_or_else(|| AppError::Internal("Token expiry overflow".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|_| AppError::Internal("Failed to create token".to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthenticatedUser {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::model::UserRole;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn test_user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Token Test".to_string(),
            email: "token@test.io".to_string(),
            password_hash: String::new(),
            role,
            company_id: None,
            is_active: true,
            is_banned: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let service = TokenService::new(AuthConfig {
            jwt_secret: "a-test-secret-at-least-16".to_string(),
            token_ttl: Duration::from_secs(3600),
        });

        let user = test_user(UserRole::Company);
        let token = service.issue(&user).unwrap();
        let verified = service.verify(&token).unwrap();

        assert_eq!(verified.id, user.id);
        assert_eq!(verified.role, UserRole::Company);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = TokenService::new(AuthConfig {
            jwt_secret: "a-test-secret-at-least-16".to_string(),
            token_ttl: Duration::from_secs(3600),
        });
        let other = TokenService::new(AuthConfig {
            jwt_secret: "another-secret-at-least-16".to_string(),
            token_ttl: Duration::from_secs(3600),
        });

        let token = other.issue(&test_user(UserRole::Freelancer)).unwrap();
        assert!(service.verify(&token).is_err());
    }
}
