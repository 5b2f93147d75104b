use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

/// A hospital tenant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub hospital_name: String,
    pub admin_name: String,
    pub admin_email: String,
    pub created_at: DateTime<Utc>,
}

/// One of the two shared secrets an organization owns.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: i64,
    pub organization_id: i64,
    pub role: Role,
    #[serde(skip_serializing)]
    pub credential_key: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A credential ready to be stored: key and hash already derived.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub role: Role,
    pub credential_key: String,
    pub password_hash: String,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        Admin => "admin",
        Staff => "staff",
    }
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}
