use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: i64,
    pub organization_id: i64,
    pub area: String,
    pub role: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub comments: Option<String>,
    pub contact_name: String,
    pub contact_email: String,
    pub status: ShiftStatus,
    pub picked_up_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an administrator supplies when posting or editing a shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInput {
    pub area: String,
    pub role: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub comments: Option<String>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
}

impl ShiftInput {
    /// Trims every text field and blanks out empty comments.
    pub fn normalized(self) -> Self {
        Self {
            area: self.area.trim().to_string(),
            role: self.role.trim().to_string(),
            date: self.date,
            start_time: self.start_time.trim().to_string(),
            end_time: self.end_time.trim().to_string(),
            comments: self
                .comments
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            contact_name: self.contact_name.trim().to_string(),
            contact_email: self.contact_email.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("area", &self.area),
            ("role", &self.role),
            ("start time", &self.start_time),
            ("end time", &self.end_time),
        ];

        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(format!("Shift {} is required", label));
            }
        }

        Ok(())
    }
}

/// Open shift together with how many requests it has collected.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PendingShift {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shift: Shift,
    pub request_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShiftListQuery {
    pub as_of: Option<NaiveDate>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum ShiftStatus {
        #[default]
        Posted => "posted",
        Requested => "requested",
        Approved => "approved",
        Removed => "removed",
    }
}

impl ShiftStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShiftStatus::Approved | ShiftStatus::Removed)
    }

    /// Lifecycle edges. The compare-and-set updates in `ShiftRepository`
    /// enforce the same graph with `WHERE status IN ('posted', 'requested')`.
    pub fn can_transition_to(&self, next: ShiftStatus) -> bool {
        !self.is_terminal()
            && matches!(
                next,
                ShiftStatus::Requested | ShiftStatus::Approved | ShiftStatus::Removed
            )
    }
}
