use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool, types::Json};

use crate::database::models::{Notification, NotificationInput, NotificationStatus};

const NOTIFICATION_COLUMNS: &str = r#"
    id,
    organization_id,
    shift_id,
    kind,
    recipients,
    subject,
    body,
    status,
    attempts,
    last_error,
    next_attempt_at,
    created_at,
    sent_at
"#;

/// The notification outbox.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes a Pending row on the caller's transaction.
    pub async fn enqueue(
        conn: &mut SqliteConnection,
        input: NotificationInput,
    ) -> Result<Notification, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (
                organization_id, shift_id, kind, recipients, subject, body,
                status, attempts, next_attempt_at, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(input.organization_id)
        .bind(input.shift_id)
        .bind(input.kind)
        .bind(Json(input.recipients))
        .bind(input.subject)
        .bind(input.body)
        .bind(NotificationStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
    }

    pub async fn list_for_organization(&self, organization_id: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE organization_id = ?
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn list_for_shift(&self, shift_id: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE shift_id = ?
            ORDER BY id ASC
            "#
        ))
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Moves due rows to Sending in one statement and returns them, oldest first.
    ///
    /// A claimed row is leased until `lease_until`; a Sending row whose lease
    /// ran out (the claiming process died mid-send) is claimable again.
    /// `organization_id` narrows the claim to one tenant's outbox.
    pub async fn claim_due(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: i64,
        organization_id: Option<i64>,
    ) -> Result<Vec<Notification>> {
        let mut notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            UPDATE notifications
            SET status = ?, next_attempt_at = ?
            WHERE id IN (
                SELECT id
                FROM notifications
                WHERE status IN (?, ?)
                  AND next_attempt_at <= ?
                  AND (? IS NULL OR organization_id = ?)
                ORDER BY id ASC
                LIMIT ?
            )
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(NotificationStatus::Sending)
        .bind(lease_until)
        .bind(NotificationStatus::Pending)
        .bind(NotificationStatus::Sending)
        .bind(now)
        .bind(organization_id)
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // RETURNING order is unspecified in SQLite
        notifications.sort_by_key(|n| n.id);
        Ok(notifications)
    }

    pub async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET status = ?, attempts = attempts + 1, last_error = NULL, sent_at = ?
            WHERE id = ?
            "#,
        )
        .bind(NotificationStatus::Sent)
        .bind(sent_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a failed attempt and returns the row to Pending until `next_attempt_at`.
    pub async fn mark_retry(
        &self,
        id: i64,
        attempts: i64,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET status = ?, attempts = ?, last_error = ?, next_attempt_at = ?
            WHERE id = ?
            "#,
        )
        .bind(NotificationStatus::Pending)
        .bind(attempts)
        .bind(error)
        .bind(next_attempt_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_failed(&self, id: i64, attempts: i64, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET status = ?, attempts = ?, last_error = ?
            WHERE id = ?
            "#,
        )
        .bind(NotificationStatus::Failed)
        .bind(attempts)
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
