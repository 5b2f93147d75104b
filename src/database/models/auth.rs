use serde::{Deserialize, Serialize};

use super::organization::{Organization, Role};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub hospital_name: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub staff_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    pub organization: Organization,
}
