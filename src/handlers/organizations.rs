use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::SessionContext;

pub async fn get_organization(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let organization_id = path.into_inner();
    session.requires_admin_of(organization_id)?;

    let organization = state.auth_service.get_organization(organization_id).await?;

    Ok(ApiResponse::success(organization))
}
