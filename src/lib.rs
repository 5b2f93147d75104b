pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use sqlx::SqlitePool;
use std::sync::Arc;

pub use config::Config;
pub use database::repositories::NotificationRepository;
pub use error::AppError;
pub use services::{AuthService, Mailer, NotificationDispatcher, SchedulingService};

pub struct AppState {
    pub auth_service: AuthService,
    pub scheduling_service: SchedulingService,
    pub notification_repository: NotificationRepository,
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        let notification_repository = NotificationRepository::new(pool.clone());

        Self {
            auth_service: AuthService::new(pool.clone(), config.clone()),
            scheduling_service: SchedulingService::new(pool),
            dispatcher: NotificationDispatcher::new(
                notification_repository.clone(),
                mailer,
                config,
            ),
            notification_repository,
        }
    }
}
