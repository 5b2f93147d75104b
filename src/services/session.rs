use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::config::Config;
use crate::database::models::Role;
use crate::error::AppError;
use crate::services::auth::verify_token;

/// Who is calling: the organization and role carried by the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub organization_id: i64,
    pub role: Role,
}

impl SessionContext {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn requires_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Administrator access required".to_string(),
            ))
        }
    }

    pub fn requires_organization(&self, organization_id: i64) -> Result<(), AppError> {
        if self.organization_id == organization_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Resource belongs to another organization".to_string(),
            ))
        }
    }

    /// Admin of exactly this organization.
    pub fn requires_admin_of(&self, organization_id: i64) -> Result<(), AppError> {
        self.requires_admin()?;
        self.requires_organization(organization_id)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequest for SessionContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(token) = bearer_token(req) else {
            return ready(Err(AppError::Unauthorized(
                "Missing or invalid authorization header".to_string(),
            )));
        };

        let Some(config) = req.app_data::<Data<Config>>() else {
            log::error!("Config missing from app data");
            return ready(Err(AppError::internal_server_error()));
        };

        let context = verify_token(config, token)
            .map(|claims| SessionContext {
                organization_id: claims.organization_id(),
                role: claims.role,
            })
            .map_err(|e| {
                log::debug!("Rejected session token: {}", e);
                AppError::Unauthorized("Invalid or expired session".to_string())
            });

        ready(context)
    }
}
