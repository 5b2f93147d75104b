use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::SessionContext;

/// A request together with the shift it is for.
pub async fn get_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;

    let detail = state
        .scheduling_service
        .get_request(session.organization_id, path.into_inner())
        .await?;

    Ok(ApiResponse::success(detail))
}
