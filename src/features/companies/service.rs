use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::companies::dto::CompanyResponseDto;
use crate::features::companies::model::Company;
use crate::features::users::model::{User, UserRole};

/// Resolve the company row for a company-role user, creating one lazily.
///
/// Accounts created before the company table was backfilled may lack a
/// company reference; the first write that needs one repairs it here.
pub async fn ensure_company_for(pool: &SqlitePool, user: &User) -> Result<Uuid> {
    if user.role != UserRole::Company {
        return Err(AppError::Forbidden(
            "Only company accounts own a company".to_string(),
        ));
    }

    if let Some(company_id) = user.company_id {
        return Ok(company_id);
    }

    let company_id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO companies (id, name, created_at) VALUES (?, ?, ?)")
        .bind(company_id)
        .bind(&user.name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE users SET company_id = ?, updated_at = ? WHERE id = ?")
        .bind(company_id)
        .bind(now)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Backfilled company {} for user {} ({})",
        company_id,
        user.id,
        user.email
    );

    Ok(company_id)
}

/// Service for company lookups
pub struct CompanyService {
    pool: SqlitePool,
}

impl CompanyService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CompanyResponseDto> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company '{}' not found", id)))?;

        Ok(company.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::service::load_user;
    use crate::shared::test_helpers::{create_user, setup_pool};

    #[tokio::test]
    async fn company_row_is_created_lazily_and_persisted() {
        let pool = setup_pool().await;
        let user = create_user(&pool, "acme@test.io", UserRole::Company).await;
        assert!(user.company_id.is_none());

        let company_id = ensure_company_for(&pool, &user).await.unwrap();

        // The user row now references the new company
        let reloaded = load_user(&pool, user.id).await.unwrap();
        assert_eq!(reloaded.company_id, Some(company_id));

        // A second call reuses the same company
        let again = ensure_company_for(&pool, &reloaded).await.unwrap();
        assert_eq!(again, company_id);

        let company = CompanyService::new(pool.clone())
            .get_by_id(company_id)
            .await
            .unwrap();
        assert_eq!(company.name, user.name);
    }

    #[tokio::test]
    async fn freelancers_never_get_a_company() {
        let pool = setup_pool().await;
        let user = create_user(&pool, "solo@test.io", UserRole::Freelancer).await;

        let err = ensure_company_for(&pool, &user).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
