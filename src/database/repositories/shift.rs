use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::{PendingShift, Shift, ShiftInput, ShiftStatus};

const SHIFT_COLUMNS: &str = r#"
    id,
    organization_id,
    area,
    role,
    date,
    start_time,
    end_time,
    comments,
    contact_name,
    contact_email,
    status,
    picked_up_by,
    approved_at,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_shift(&self, organization_id: i64, input: ShiftInput) -> Result<Shift> {
        let now = Utc::now();
        let shift = sqlx::query_as::<_, Shift>(&format!(
            r#"
            INSERT INTO shifts (
                organization_id, area, role, date, start_time, end_time, comments,
                contact_name, contact_email, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(input.area)
        .bind(input.role)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.comments)
        .bind(input.contact_name)
        .bind(input.contact_email)
        .bind(ShiftStatus::Posted)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(shift)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Open shifts on or after `as_of`, in the order staff browse them.
    pub async fn list_open(&self, organization_id: i64, as_of: NaiveDate) -> Result<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&format!(
            r#"
            SELECT {SHIFT_COLUMNS}
            FROM shifts
            WHERE organization_id = ?
                AND status NOT IN (?, ?)
                AND date >= ?
            ORDER BY date, start_time, area, role
            "#
        ))
        .bind(organization_id)
        .bind(ShiftStatus::Approved)
        .bind(ShiftStatus::Removed)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    /// Same filter as [`Self::list_open`], with a request count per shift.
    pub async fn list_pending_with_request_counts(
        &self,
        organization_id: i64,
        as_of: NaiveDate,
    ) -> Result<Vec<PendingShift>> {
        let shifts = sqlx::query_as::<_, PendingShift>(
            r#"
            SELECT
                s.id,
                s.organization_id,
                s.area,
                s.role,
                s.date,
                s.start_time,
                s.end_time,
                s.comments,
                s.contact_name,
                s.contact_email,
                s.status,
                s.picked_up_by,
                s.approved_at,
                s.created_at,
                s.updated_at,
                COUNT(r.id) AS request_count
            FROM shifts s
            LEFT JOIN requests r ON r.shift_id = s.id
            WHERE s.organization_id = ?
                AND s.status NOT IN (?, ?)
                AND s.date >= ?
            GROUP BY s.id
            ORDER BY s.area, s.role, s.date, s.start_time, s.end_time
            "#,
        )
        .bind(organization_id)
        .bind(ShiftStatus::Approved)
        .bind(ShiftStatus::Removed)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    pub async fn list_history(&self, organization_id: i64) -> Result<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&format!(
            r#"
            SELECT {SHIFT_COLUMNS}
            FROM shifts
            WHERE organization_id = ? AND status = ?
            ORDER BY picked_up_by, date, start_time, area, role
            "#
        ))
        .bind(organization_id)
        .bind(ShiftStatus::Approved)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    /// Full overwrite of the editable fields. Returns `None` when the shift
    /// is missing or already terminal.
    pub async fn update_details(&self, id: i64, input: ShiftInput) -> Result<Option<Shift>> {
        let now = Utc::now();
        let shift = sqlx::query_as::<_, Shift>(&format!(
            r#"
            UPDATE shifts
            SET
                area = ?,
                role = ?,
                date = ?,
                start_time = ?,
                end_time = ?,
                comments = ?,
                contact_name = ?,
                contact_email = ?,
                updated_at = ?
            WHERE id = ? AND status IN (?, ?)
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(input.area)
        .bind(input.role)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.comments)
        .bind(input.contact_name)
        .bind(input.contact_email)
        .bind(now)
        .bind(id)
        .bind(ShiftStatus::Posted)
        .bind(ShiftStatus::Requested)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    /// Compare-and-set from an open status to `next`.
    ///
    /// Matches no row (returns `None`) once the shift is Approved or Removed,
    /// which is what keeps terminal states terminal under concurrent writers.
    pub async fn transition_open(
        conn: &mut SqliteConnection,
        id: i64,
        next: ShiftStatus,
    ) -> Result<Option<Shift>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(&format!(
            r#"
            UPDATE shifts
            SET status = ?, updated_at = ?
            WHERE id = ? AND status IN (?, ?)
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(ShiftStatus::Posted)
        .bind(ShiftStatus::Requested)
        .fetch_optional(conn)
        .await
    }

    /// Compare-and-set to Approved, stamping who picked it up and when.
    pub async fn mark_approved(
        conn: &mut SqliteConnection,
        id: i64,
        picked_up_by: &str,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<Shift>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(&format!(
            r#"
            UPDATE shifts
            SET status = ?, picked_up_by = ?, approved_at = ?, updated_at = ?
            WHERE id = ? AND status IN (?, ?)
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(ShiftStatus::Approved)
        .bind(picked_up_by)
        .bind(approved_at)
        .bind(approved_at)
        .bind(id)
        .bind(ShiftStatus::Posted)
        .bind(ShiftStatus::Requested)
        .fetch_optional(conn)
        .await
    }
}
