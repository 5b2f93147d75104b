use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;
use super::shift::Shift;

/// A staff member's claim on a shift.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRequest {
    pub id: i64,
    pub shift_id: i64,
    pub organization_id: i64,
    pub requester_name: String,
    pub requester_email: String,
    pub requester_phone: Option<String>,
    pub comments: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRequestInput {
    pub requester_name: String,
    pub requester_email: String,
    pub requester_phone: Option<String>,
    pub comments: Option<String>,
}

impl ShiftRequestInput {
    pub fn normalized(self) -> Self {
        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            requester_name: self.requester_name.trim().to_string(),
            requester_email: self.requester_email.trim().to_string(),
            requester_phone: optional(self.requester_phone),
            comments: optional(self.comments),
        }
    }
}

/// Request row with the shift columns an approver needs to see alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: ShiftRequest,
    pub area: String,
    pub role: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithShift {
    pub request: ShiftRequest,
    pub shift: Shift,
}

/// Everything `approve_request` changed, as committed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOutcome {
    pub shift: Shift,
    pub approved: ShiftRequest,
    pub passed: Vec<ShiftRequest>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum RequestStatus {
        #[default]
        Requested => "requested",
        Approved => "approved",
        Passed => "passed",
    }
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Requested)
    }

    /// Only a Requested row moves. `ShiftRequestRepository::mark_approved`
    /// guards the same edge with `WHERE status = 'requested'`.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Requested, RequestStatus::Approved)
                | (RequestStatus::Requested, RequestStatus::Passed)
        )
    }
}
