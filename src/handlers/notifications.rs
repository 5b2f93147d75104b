use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::SessionContext;

pub async fn get_notifications(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;

    let notifications = state
        .notification_repository
        .list_for_organization(session.organization_id)
        .await?;

    Ok(ApiResponse::success(notifications))
}

/// Runs one dispatcher pass over the caller's outbox now instead of waiting for the next poll.
pub async fn dispatch_notifications(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;

    let summary = state
        .dispatcher
        .dispatch_pending_for(session.organization_id)
        .await?;
    log::info!(
        "Organization {} triggered dispatch: {} sent, {} retried, {} failed",
        session.organization_id,
        summary.sent,
        summary.retried,
        summary.failed
    );

    Ok(ApiResponse::success(summary))
}
