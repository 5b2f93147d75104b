use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::config::Config;
use crate::database::models::{DispatchSummary, Notification};
use crate::database::repositories::NotificationRepository;
use crate::services::mailer::{Mailer, OutgoingMail};

/// Longest wait between two delivery attempts of one notification.
pub const MAX_RETRY_DELAY_SECS: i64 = 3600;

/// How long a claimed row stays reserved for the pass that claimed it.
pub const CLAIM_LEASE_SECS: i64 = 300;

const BATCH_SIZE: i64 = 50;

/// Exponential backoff: 2^attempts seconds, capped at [`MAX_RETRY_DELAY_SECS`].
pub fn retry_delay_secs(attempts: i64) -> i64 {
    let exponent = attempts.clamp(0, 31) as u32;
    2i64.pow(exponent).min(MAX_RETRY_DELAY_SECS)
}

/// Drains the notification outbox in the background.
#[derive(Clone)]
pub struct NotificationDispatcher {
    repository: NotificationRepository,
    mailer: Arc<dyn Mailer>,
    poll_interval: Duration,
    max_attempts: i64,
    shutdown: Arc<Notify>,
}

impl NotificationDispatcher {
    pub fn new(repository: NotificationRepository, mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        Self {
            repository,
            mailer,
            poll_interval: Duration::from_secs(config.notification_poll_seconds.max(1)),
            max_attempts: config.notification_max_attempts.max(1),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Signal the run loop to stop after its current pass.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Poll the outbox until [`Self::shutdown`] is called.
    pub async fn run(&self) {
        log::info!(
            "Notification dispatcher started (poll every {}s, max {} attempts)",
            self.poll_interval.as_secs(),
            self.max_attempts
        );

        loop {
            match self.dispatch_pending().await {
                Ok(summary) if summary != DispatchSummary::default() => {
                    log::info!(
                        "Dispatched notifications: {} sent, {} retried, {} failed",
                        summary.sent,
                        summary.retried,
                        summary.failed
                    );
                }
                Ok(_) => {}
                Err(e) => log::error!("Notification dispatch pass failed: {}", e),
            }

            tokio::select! {
                _ = self.shutdown.notified() => {
                    log::info!("Notification dispatcher shutting down");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// One pass over every due Pending row.
    pub async fn dispatch_pending(&self) -> Result<DispatchSummary> {
        self.dispatch(None).await
    }

    /// One pass over the due rows of a single organization.
    pub async fn dispatch_pending_for(&self, organization_id: i64) -> Result<DispatchSummary> {
        self.dispatch(Some(organization_id)).await
    }

    async fn dispatch(&self, organization_id: Option<i64>) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();
        let now = Utc::now();
        let claimed = self
            .repository
            .claim_due(
                now,
                now + ChronoDuration::seconds(CLAIM_LEASE_SECS),
                BATCH_SIZE,
                organization_id,
            )
            .await?;

        for notification in claimed {
            self.deliver(&notification, &mut summary).await?;
        }

        Ok(summary)
    }

    async fn deliver(&self, notification: &Notification, summary: &mut DispatchSummary) -> Result<()> {
        let mail = OutgoingMail::from(notification);

        match self.mailer.send(&mail).await {
            Ok(()) => {
                self.repository
                    .mark_sent(notification.id, Utc::now())
                    .await?;
                summary.sent += 1;
            }
            Err(e) => {
                let attempts = notification.attempts + 1;
                let error = e.to_string();

                if attempts >= self.max_attempts {
                    log::error!(
                        "Giving up on notification {} after {} attempts: {}",
                        notification.id,
                        attempts,
                        error
                    );
                    self.repository
                        .mark_failed(notification.id, attempts, &error)
                        .await?;
                    summary.failed += 1;
                } else {
                    let next_attempt_at =
                        Utc::now() + ChronoDuration::seconds(retry_delay_secs(attempts));
                    log::warn!(
                        "Notification {} attempt {} failed, retrying at {}: {}",
                        notification.id,
                        attempts,
                        next_attempt_at,
                        error
                    );
                    self.repository
                        .mark_retry(notification.id, attempts, &error, next_attempt_at)
                        .await?;
                    summary.retried += 1;
                }
            }
        }

        Ok(())
    }
}
