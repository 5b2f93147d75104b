#![allow(dead_code)]

use actix_web::web;
use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use futures::future::BoxFuture;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use tempfile::TempDir;

use shift_helper::database::init_database;
use shift_helper::database::models::{AuthResponse, ShiftInput, ShiftRequestInput, SignupInput};
use shift_helper::services::{MailError, Mailer, OutgoingMail};
use shift_helper::{AppState, Config};

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        secret_key: "test-secret-key-that-is-long-enough".to_string(),
        session_expiration_hours: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        client_base_url: "http://localhost:3000".to_string(),
        email_address: None,
        email_password: None,
        smtp_host: "localhost".to_string(),
        smtp_port: 2525,
        notification_poll_seconds: 1,
        notification_max_attempts: 3,
        // bcrypt's minimum, keeps signup fast
        password_hash_cost: 4,
    }
}

/// Captures outgoing mail; can be switched to fail every send or to stall
/// like a slow relay.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: AtomicBool,
    delay_ms: AtomicU64,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: StdDuration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Mailer for RecordingMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let delay_ms = self.delay_ms.load(Ordering::SeqCst);
            if delay_ms > 0 {
                tokio::time::sleep(StdDuration::from_millis(delay_ms)).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(MailError::Rejected("relay refused".to_string()));
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        })
    }
}

pub struct TestContext {
    pub db: TestDb,
    pub config: Config,
    pub mailer: Arc<RecordingMailer>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Result<Self> {
        let db = TestDb::new().await?;
        let mailer = Arc::new(RecordingMailer::default());
        let state = web::Data::new(AppState::new(db.pool.clone(), &config, mailer.clone()));

        Ok(TestContext {
            db,
            config,
            mailer,
            state,
        })
    }

    pub fn config_data(&self) -> web::Data<Config> {
        web::Data::new(self.config.clone())
    }

    /// Registers a hospital with the given secrets and returns the admin session.
    pub async fn signup(&self, admin_password: &str, staff_password: &str) -> AuthResponse {
        self.state
            .auth_service
            .signup(MockData::signup(admin_password, staff_password))
            .await
            .expect("signup should succeed")
    }
}

// Mock data generators
pub struct MockData;

impl MockData {
    pub fn signup(admin_password: &str, staff_password: &str) -> SignupInput {
        SignupInput {
            hospital_name: "Mercy General".to_string(),
            admin_name: Name().fake(),
            admin_email: SafeEmail().fake(),
            admin_password: admin_password.to_string(),
            staff_password: staff_password.to_string(),
        }
    }

    pub fn shift(area: &str, role: &str, date: NaiveDate, start_time: &str) -> ShiftInput {
        ShiftInput {
            area: area.to_string(),
            role: role.to_string(),
            date,
            start_time: start_time.to_string(),
            end_time: "7pm".to_string(),
            comments: Some("Bring your badge".to_string()),
            contact_name: "Casey Contact".to_string(),
            contact_email: "casey@mercy.org".to_string(),
        }
    }

    pub fn request() -> ShiftRequestInput {
        Self::request_from(&SafeEmail().fake::<String>())
    }

    pub fn request_from(email: &str) -> ShiftRequestInput {
        ShiftRequestInput {
            requester_name: Name().fake(),
            requester_email: email.to_string(),
            requester_phone: Some("555-0100".to_string()),
            comments: None,
        }
    }
}

/// A date `days` from today (UTC).
pub fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}
