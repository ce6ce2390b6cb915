use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::companies::dto::CompanyResponseDto;
use crate::features::companies::service::CompanyService;
use crate::shared::types::ApiResponse;

/// Get company by ID
#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company found", body = ApiResponse<CompanyResponseDto>),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
pub async fn get_company(
    _user: AuthenticatedUser,
    State(service): State<Arc<CompanyService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CompanyResponseDto>>> {
    let company = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(company), None, None)))
}
