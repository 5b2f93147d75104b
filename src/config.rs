use anyhow::Result;
use std::env;

const DEFAULT_SECRET_KEY: &str = "shift-helper-development-secret-change-this-in-production";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Signs session tokens and keys credential lookups.
    pub secret_key: String,
    pub session_expiration_hours: i64,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub client_base_url: String,
    /// Sender address and SMTP username.
    pub email_address: Option<String>,
    pub email_password: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub notification_poll_seconds: u64,
    pub notification_max_attempts: i64,
    pub password_hash_cost: u32,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: var_or("DATABASE_URL", "sqlite:shifthelper.db"),
            secret_key: var_or("SECRET_KEY", DEFAULT_SECRET_KEY),
            session_expiration_hours: parsed_or("SESSION_EXPIRATION_HOURS", 12),
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 8080),
            environment: var_or("ENVIRONMENT", "development"),
            client_base_url: var_or("BASE_URL", "http://localhost:3000"),
            email_address: env::var("EMAIL").ok().filter(|v| !v.is_empty()),
            email_password: env::var("EMAIL_PASSWORD").ok().filter(|v| !v.is_empty()),
            smtp_host: var_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: parsed_or("SMTP_PORT", 587),
            notification_poll_seconds: parsed_or("NOTIFICATION_POLL_SECONDS", 10),
            notification_max_attempts: parsed_or("NOTIFICATION_MAX_ATTEMPTS", 5),
            password_hash_cost: parsed_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Mail goes out over SMTP only when both halves of the login are set.
    pub fn mail_configured(&self) -> bool {
        self.email_address.is_some() && self.email_password.is_some()
    }
}
