use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::LazyLock;

use crate::config::Config;
use crate::database::models::{
    AuthResponse, LoginInput, NewCredential, Organization, Role, SignupInput,
};
use crate::database::repositories::OrganizationRepository;
use crate::database::transaction::run_in_transaction;
use crate::error::AppError;
use crate::services::credentials::credential_key;

pub const LOGIN_FAILED_MESSAGE: &str =
    "Login does not exist. Please try again or contact your site's administrator";

const MIN_SECRET_LENGTH: usize = 4;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // organization id
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn organization_id(&self) -> i64 {
        self.sub
    }
}

pub fn issue_token(config: &Config, organization_id: i64, role: Role) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.session_expiration_hours))
        .ok_or_else(|| AppError::internal_server_error_message("Session expiry out of range"))?
        .timestamp() as usize;

    let claims = Claims {
        sub: organization_id,
        role,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_token(config: &Config, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_key.as_ref()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    organization_repository: OrganizationRepository,
    config: Config,
}

impl AuthService {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            organization_repository: OrganizationRepository::new(pool.clone()),
            pool,
            config,
        }
    }

    /// Registers a hospital with its admin and staff secrets and signs the
    /// admin in.
    pub async fn signup(&self, input: SignupInput) -> Result<AuthResponse, AppError> {
        let input = SignupInput {
            hospital_name: input.hospital_name.trim().to_string(),
            admin_name: input.admin_name.trim().to_string(),
            admin_email: input.admin_email.trim().to_string(),
            ..input
        };
        validate_signup(&input)?;

        let admin_key = credential_key(&self.config.secret_key, &input.admin_password);
        let staff_key = credential_key(&self.config.secret_key, &input.staff_password);

        if self
            .organization_repository
            .credential_key_exists(&admin_key)
            .await?
        {
            return Err(AppError::BadRequest(
                "Admin password is already in use, please choose another".to_string(),
            ));
        }
        if self
            .organization_repository
            .credential_key_exists(&staff_key)
            .await?
        {
            return Err(AppError::BadRequest(
                "Staff password is already in use, please choose another".to_string(),
            ));
        }

        let cost = self.config.password_hash_cost;
        let credentials = vec![
            NewCredential {
                role: Role::Admin,
                credential_key: admin_key,
                password_hash: hash(&input.admin_password, cost)?,
            },
            NewCredential {
                role: Role::Staff,
                credential_key: staff_key,
                password_hash: hash(&input.staff_password, cost)?,
            },
        ];

        let organization = run_in_transaction(&self.pool, |tx| {
            Box::pin(async move {
                OrganizationRepository::insert_with_credentials(&mut **tx, &input, &credentials)
                    .await
                    .map_err(|e| match e {
                        // a concurrent signup took the same secret after the pre-check
                        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                            AppError::BadRequest(
                                "Password is already in use, please choose another".to_string(),
                            )
                        }
                        other => AppError::from(other),
                    })
            })
        })
        .await?;

        log::info!(
            "Registered organization {} ({})",
            organization.id,
            organization.hospital_name
        );

        let token = issue_token(&self.config, organization.id, Role::Admin)?;

        Ok(AuthResponse {
            token,
            role: Role::Admin,
            organization,
        })
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse, AppError> {
        let login_failed = || AppError::Unauthorized(LOGIN_FAILED_MESSAGE.to_string());

        if input.password.is_empty() {
            return Err(login_failed());
        }

        let key = credential_key(&self.config.secret_key, &input.password);
        let credential = self
            .organization_repository
            .find_credential_by_key(&key)
            .await?
            .ok_or_else(login_failed)?;

        if !verify(&input.password, &credential.password_hash)? {
            return Err(login_failed());
        }

        let organization = self
            .organization_repository
            .find_by_id(credential.organization_id)
            .await?
            .ok_or_else(login_failed)?;

        let token = issue_token(&self.config, organization.id, credential.role)?;

        log::info!(
            "Organization {} signed in as {}",
            organization.id,
            credential.role
        );

        Ok(AuthResponse {
            token,
            role: credential.role,
            organization,
        })
    }

    pub async fn get_organization(&self, organization_id: i64) -> Result<Organization, AppError> {
        self.organization_repository
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Organization {} not found", organization_id))
            })
    }
}

fn validate_signup(input: &SignupInput) -> Result<(), AppError> {
    if input.hospital_name.is_empty() {
        return Err(AppError::BadRequest("Hospital name is required".to_string()));
    }
    if input.admin_name.is_empty() {
        return Err(AppError::BadRequest("Admin name is required".to_string()));
    }
    if !is_valid_email(&input.admin_email) {
        return Err(AppError::BadRequest(
            "A valid admin email is required".to_string(),
        ));
    }
    if input.admin_password.chars().count() < MIN_SECRET_LENGTH
        || input.staff_password.chars().count() < MIN_SECRET_LENGTH
    {
        return Err(AppError::BadRequest(format!(
            "Passwords must be at least {} characters",
            MIN_SECRET_LENGTH
        )));
    }
    if input.admin_password == input.staff_password {
        return Err(AppError::BadRequest(
            "Admin and staff passwords must be different".to_string(),
        ));
    }

    Ok(())
}
