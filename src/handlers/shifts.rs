use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::{ShiftInput, ShiftListQuery, ShiftRequestInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{SessionContext, scheduling::today};

pub async fn create_shift(
    state: web::Data<AppState>,
    session: SessionContext,
    input: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;

    let shift = state
        .scheduling_service
        .post_shift(session.organization_id, input.into_inner())
        .await?;

    Ok(ApiResponse::created(shift))
}

/// Open shifts for staff to browse.
pub async fn get_shifts(
    state: web::Data<AppState>,
    session: SessionContext,
    query: web::Query<ShiftListQuery>,
) -> Result<HttpResponse, AppError> {
    let as_of = query.as_of.unwrap_or_else(today);

    let shifts = state
        .scheduling_service
        .list_open_shifts(session.organization_id, as_of)
        .await?;

    Ok(ApiResponse::success(shifts))
}

pub async fn get_pending_shifts(
    state: web::Data<AppState>,
    session: SessionContext,
    query: web::Query<ShiftListQuery>,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;
    let as_of = query.as_of.unwrap_or_else(today);

    let shifts = state
        .scheduling_service
        .list_pending_with_request_counts(session.organization_id, as_of)
        .await?;

    Ok(ApiResponse::success(shifts))
}

pub async fn get_history(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    let shifts = state
        .scheduling_service
        .list_history(session.organization_id)
        .await?;

    Ok(ApiResponse::success(shifts))
}

// Public: requesters follow a link without signing in.
pub async fn get_shift(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let shift = state.scheduling_service.get_shift(path.into_inner()).await?;

    Ok(ApiResponse::success(shift))
}

pub async fn update_shift(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
    input: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;

    let shift = state
        .scheduling_service
        .edit_shift(session.organization_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(ApiResponse::success(shift))
}

pub async fn delete_shift(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;

    let shift = state
        .scheduling_service
        .remove_shift(session.organization_id, path.into_inner())
        .await?;

    Ok(ApiResponse::success_with_message(shift, "Shift removed"))
}

pub async fn submit_request(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    input: web::Json<ShiftRequestInput>,
) -> Result<HttpResponse, AppError> {
    let request = state
        .scheduling_service
        .submit_request(path.into_inner(), input.into_inner())
        .await?;

    Ok(ApiResponse::created(request))
}

pub async fn get_shift_requests(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;

    let requests = state
        .scheduling_service
        .list_requests_for_shift(session.organization_id, path.into_inner())
        .await?;

    Ok(ApiResponse::success(requests))
}

pub async fn approve_request(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    session.requires_admin()?;
    let (shift_id, request_id) = path.into_inner();

    let outcome = state
        .scheduling_service
        .approve_request(session.organization_id, shift_id, request_id)
        .await?;

    Ok(ApiResponse::success(outcome))
}
