use actix_web::{HttpRequest, HttpResponse, web};

use crate::AppState;
use crate::database::models::{LoginInput, SignupInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestIdExt;
use crate::services::SessionContext;

pub async fn signup(
    state: web::Data<AppState>,
    input: web::Json<SignupInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.signup(input.into_inner()).await?;

    Ok(ApiResponse::created(response))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.login(input.into_inner()).await?;

    Ok(ApiResponse::success(response))
}

// Tokens are stateless; the client drops its copy.
pub async fn logout(
    req: HttpRequest,
    session: Option<SessionContext>,
) -> Result<HttpResponse, AppError> {
    if let Some(session) = session {
        log::info!(
            "Organization {} {} session logged out (correlation_id={})",
            session.organization_id,
            session.role,
            req.correlation_id().unwrap_or_default()
        );
    }

    Ok(ApiResponse::<()>::success_message("Logged out"))
}

pub async fn me(session: SessionContext) -> Result<HttpResponse, AppError> {
    Ok(ApiResponse::success(session))
}
