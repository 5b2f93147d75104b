use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::database::models::{
    ApprovalOutcome, PendingShift, RequestDetail, RequestStatus, RequestWithShift, Shift,
    ShiftInput, ShiftRequest, ShiftRequestInput, ShiftStatus,
};
use crate::database::repositories::{NotificationRepository, ShiftRepository, ShiftRequestRepository};
use crate::database::transaction::run_in_transaction;
use crate::error::AppError;
use crate::services::auth::is_valid_email;
use crate::services::notifications;

/// Shift and request lifecycle.
///
/// Every transition is a compare-and-set on `shifts.status` inside one
/// transaction that also writes the request rows and outbox entries, so a
/// losing concurrent writer sees `Conflict` and commits nothing.
#[derive(Clone)]
pub struct SchedulingService {
    pool: SqlitePool,
    shifts: ShiftRepository,
    requests: ShiftRequestRepository,
}

fn shift_not_found(shift_id: i64) -> AppError {
    AppError::NotFound(format!("Shift {} not found", shift_id))
}

fn shift_closed(shift_id: i64) -> AppError {
    AppError::Conflict(format!(
        "Shift {} has already been approved or removed",
        shift_id
    ))
}

fn validate_shift(input: &ShiftInput) -> Result<(), AppError> {
    input.validate().map_err(AppError::BadRequest)?;
    if !input.contact_email.is_empty() && !is_valid_email(&input.contact_email) {
        return Err(AppError::BadRequest(
            "Contact email address is not valid".to_string(),
        ));
    }
    Ok(())
}

impl SchedulingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            shifts: ShiftRepository::new(pool.clone()),
            requests: ShiftRequestRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn post_shift(&self, organization_id: i64, input: ShiftInput) -> Result<Shift, AppError> {
        let input = input.normalized();
        validate_shift(&input)?;

        let shift = self.shifts.create_shift(organization_id, input).await?;
        log::info!(
            "Organization {} posted shift {} ({} {} on {})",
            organization_id,
            shift.id,
            shift.area,
            shift.role,
            shift.date
        );

        Ok(shift)
    }

    pub async fn get_shift(&self, shift_id: i64) -> Result<Shift, AppError> {
        self.shifts
            .find_by_id(shift_id)
            .await?
            .ok_or_else(|| shift_not_found(shift_id))
    }

    /// The shift, provided it belongs to `organization_id`.
    async fn organization_shift(&self, organization_id: i64, shift_id: i64) -> Result<Shift, AppError> {
        let shift = self.get_shift(shift_id).await?;
        if shift.organization_id != organization_id {
            return Err(shift_not_found(shift_id));
        }
        Ok(shift)
    }

    pub async fn edit_shift(
        &self,
        organization_id: i64,
        shift_id: i64,
        input: ShiftInput,
    ) -> Result<Shift, AppError> {
        let input = input.normalized();
        validate_shift(&input)?;

        self.organization_shift(organization_id, shift_id).await?;

        self.shifts
            .update_details(shift_id, input)
            .await?
            .ok_or_else(|| shift_closed(shift_id))
    }

    /// Soft delete. Requests on the shift are left as they are.
    pub async fn remove_shift(&self, organization_id: i64, shift_id: i64) -> Result<Shift, AppError> {
        let shift = self.organization_shift(organization_id, shift_id).await?;
        if !shift.status.can_transition_to(ShiftStatus::Removed) {
            return Err(shift_closed(shift_id));
        }

        let mut conn = self.pool.acquire().await?;
        let shift = ShiftRepository::transition_open(&mut conn, shift_id, ShiftStatus::Removed)
            .await?
            .ok_or_else(|| shift_closed(shift_id))?;

        log::info!("Organization {} removed shift {}", organization_id, shift_id);
        Ok(shift)
    }

    pub async fn submit_request(
        &self,
        shift_id: i64,
        input: ShiftRequestInput,
    ) -> Result<ShiftRequest, AppError> {
        let input = input.normalized();
        if input.requester_name.is_empty() {
            return Err(AppError::BadRequest("Your name is required".to_string()));
        }
        if !is_valid_email(&input.requester_email) {
            return Err(AppError::BadRequest(
                "A valid email address is required".to_string(),
            ));
        }

        let shift = self.get_shift(shift_id).await?;
        if !shift.status.can_transition_to(ShiftStatus::Requested) {
            return Err(shift_closed(shift_id));
        }

        let request = run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let shift = ShiftRepository::transition_open(&mut **tx, shift_id, ShiftStatus::Requested)
                    .await?
                    .ok_or_else(|| shift_closed(shift_id))?;

                let request = ShiftRequestRepository::insert(&mut **tx, &shift, input).await?;

                if let Some(notification) = notifications::shift_requested(&shift, &request) {
                    NotificationRepository::enqueue(&mut **tx, notification).await?;
                }

                Ok(request)
            })
        })
        .await?;

        log::info!(
            "Request {} submitted for shift {} by {}",
            request.id,
            shift_id,
            request.requester_email
        );

        Ok(request)
    }

    /// Gives the shift to one requester and passes everyone else.
    pub async fn approve_request(
        &self,
        organization_id: i64,
        shift_id: i64,
        request_id: i64,
    ) -> Result<ApprovalOutcome, AppError> {
        let shift = self.organization_shift(organization_id, shift_id).await?;

        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", request_id)))?;

        if request.shift_id != shift_id {
            return Err(AppError::BadRequest(format!(
                "Request {} is not for shift {}",
                request_id, shift_id
            )));
        }
        if !request.status.can_transition_to(RequestStatus::Approved) {
            return Err(AppError::Conflict(format!(
                "Request {} is already {}",
                request_id, request.status
            )));
        }
        if !shift.status.can_transition_to(ShiftStatus::Approved) {
            return Err(shift_closed(shift_id));
        }

        let picked_up_by = request.requester_email;
        let outcome = run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let shift = ShiftRepository::mark_approved(&mut **tx, shift_id, &picked_up_by, now)
                    .await?
                    .ok_or_else(|| shift_closed(shift_id))?;

                let approved =
                    ShiftRequestRepository::mark_approved(&mut **tx, request_id, shift_id, now)
                        .await?
                        .ok_or_else(|| {
                            AppError::Conflict(format!("Request {} is no longer open", request_id))
                        })?;

                let passed =
                    ShiftRequestRepository::pass_siblings(&mut **tx, shift_id, request_id).await?;

                if let Some(notification) = notifications::request_approved(&shift, &approved) {
                    NotificationRepository::enqueue(&mut **tx, notification).await?;
                }
                if let Some(notification) = notifications::request_passed(&shift, &passed) {
                    NotificationRepository::enqueue(&mut **tx, notification).await?;
                }

                Ok(ApprovalOutcome {
                    shift,
                    approved,
                    passed,
                })
            })
        })
        .await?;

        log::info!(
            "Shift {} approved for request {} ({} passed)",
            shift_id,
            request_id,
            outcome.passed.len()
        );

        Ok(outcome)
    }

    pub async fn list_open_shifts(
        &self,
        organization_id: i64,
        as_of: NaiveDate,
    ) -> Result<Vec<Shift>, AppError> {
        Ok(self.shifts.list_open(organization_id, as_of).await?)
    }

    pub async fn list_pending_with_request_counts(
        &self,
        organization_id: i64,
        as_of: NaiveDate,
    ) -> Result<Vec<PendingShift>, AppError> {
        Ok(self
            .shifts
            .list_pending_with_request_counts(organization_id, as_of)
            .await?)
    }

    pub async fn list_history(&self, organization_id: i64) -> Result<Vec<Shift>, AppError> {
        Ok(self.shifts.list_history(organization_id).await?)
    }

    pub async fn list_requests_for_shift(
        &self,
        organization_id: i64,
        shift_id: i64,
    ) -> Result<Vec<RequestDetail>, AppError> {
        self.organization_shift(organization_id, shift_id).await?;
        Ok(self.requests.list_for_shift(shift_id).await?)
    }

    pub async fn get_request(
        &self,
        organization_id: i64,
        request_id: i64,
    ) -> Result<RequestWithShift, AppError> {
        let not_found = || AppError::NotFound(format!("Request {} not found", request_id));

        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .filter(|r| r.organization_id == organization_id)
            .ok_or_else(not_found)?;

        let shift = self.organization_shift(organization_id, request.shift_id).await?;

        Ok(RequestWithShift { request, shift })
    }
}

/// Default `as_of` for the open and pending lists.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
