use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::{RequestDetail, RequestStatus, Shift, ShiftRequest, ShiftRequestInput};

const REQUEST_COLUMNS: &str = r#"
    id,
    shift_id,
    organization_id,
    requester_name,
    requester_email,
    requester_phone,
    comments,
    status,
    created_at,
    approved_at
"#;

#[derive(Clone)]
pub struct ShiftRequestRepository {
    pool: SqlitePool,
}

impl ShiftRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ShiftRequest>> {
        let request = sqlx::query_as::<_, ShiftRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Every request on a shift, oldest first, with the shift's details joined in.
    pub async fn list_for_shift(&self, shift_id: i64) -> Result<Vec<RequestDetail>> {
        let requests = sqlx::query_as::<_, RequestDetail>(
            r#"
            SELECT
                r.id,
                r.shift_id,
                r.organization_id,
                r.requester_name,
                r.requester_email,
                r.requester_phone,
                r.comments,
                r.status,
                r.created_at,
                r.approved_at,
                s.area,
                s.role,
                s.date,
                s.start_time,
                s.end_time
            FROM requests r
            INNER JOIN shifts s ON s.id = r.shift_id
            WHERE r.shift_id = ?
            ORDER BY r.created_at ASC, r.id ASC
            "#,
        )
        .bind(shift_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        shift: &Shift,
        input: ShiftRequestInput,
    ) -> Result<ShiftRequest, sqlx::Error> {
        sqlx::query_as::<_, ShiftRequest>(&format!(
            r#"
            INSERT INTO requests (
                shift_id, organization_id, requester_name, requester_email,
                requester_phone, comments, status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(shift.id)
        .bind(shift.organization_id)
        .bind(input.requester_name)
        .bind(input.requester_email)
        .bind(input.requester_phone)
        .bind(input.comments)
        .bind(RequestStatus::Requested)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    /// Requested → Approved for one request of `shift_id`; `None` if it already moved.
    pub async fn mark_approved(
        conn: &mut SqliteConnection,
        id: i64,
        shift_id: i64,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<ShiftRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftRequest>(&format!(
            r#"
            UPDATE requests
            SET status = ?, approved_at = ?
            WHERE id = ? AND shift_id = ? AND status = ?
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(RequestStatus::Approved)
        .bind(approved_at)
        .bind(id)
        .bind(shift_id)
        .bind(RequestStatus::Requested)
        .fetch_optional(conn)
        .await
    }

    /// Passes every request on the shift that is not the approved one.
    pub async fn pass_siblings(
        conn: &mut SqliteConnection,
        shift_id: i64,
        approved_id: i64,
    ) -> Result<Vec<ShiftRequest>, sqlx::Error> {
        let mut passed = sqlx::query_as::<_, ShiftRequest>(&format!(
            r#"
            UPDATE requests
            SET status = ?
            WHERE shift_id = ? AND id != ? AND status != ?
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(RequestStatus::Passed)
        .bind(shift_id)
        .bind(approved_id)
        .bind(RequestStatus::Approved)
        .fetch_all(conn)
        .await?;

        // RETURNING order is unspecified in SQLite
        passed.sort_by_key(|r| (r.created_at, r.id));
        Ok(passed)
    }
}
