use crate::database::models::{NotificationInput, NotificationKind, Shift, ShiftRequest};
use crate::services::auth::is_valid_email;

const SIGNATURE: &str = "From,\nYour trusty pals at Shift Helper";

/// Trimmed, deduplicated addresses. Blank and malformed ones are skipped.
fn recipients<'a>(addresses: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for address in addresses.into_iter().map(str::trim) {
        if address.is_empty() || out.iter().any(|a| a == address) {
            continue;
        }
        if !is_valid_email(address) {
            log::warn!("Dropping malformed recipient address {:?}", address);
            continue;
        }
        out.push(address.to_string());
    }
    out
}

fn notification(
    shift: &Shift,
    kind: NotificationKind,
    recipients: Vec<String>,
    subject: String,
    body: String,
) -> Option<NotificationInput> {
    if recipients.is_empty() {
        log::warn!(
            "No recipients for {} notification on shift {}, skipping",
            kind,
            shift.id
        );
        return None;
    }

    Some(NotificationInput {
        organization_id: shift.organization_id,
        shift_id: shift.id,
        kind,
        recipients,
        subject,
        body,
    })
}

/// Tells the shift's contact someone asked for it.
pub fn shift_requested(shift: &Shift, request: &ShiftRequest) -> Option<NotificationInput> {
    let subject = format!(
        "Your posted shift on {} in the {} area has been requested!",
        shift.date, shift.area
    );
    let body = format!(
        "{} - great news, your posted shift on {} in the {} area was requested by {} ({})!\n\
         Please navigate to the app to review the request.\n\n{}",
        shift.contact_name,
        shift.date,
        shift.area,
        request.requester_name,
        request.requester_email,
        SIGNATURE
    );

    notification(
        shift,
        NotificationKind::ShiftRequested,
        recipients([shift.contact_email.as_str()]),
        subject,
        body,
    )
}

pub fn request_approved(shift: &Shift, approved: &ShiftRequest) -> Option<NotificationInput> {
    let subject = format!("Your request for the {} shift has been approved!", shift.date);
    let body = format!(
        "{} - great news, your request for the {} shift in the {} area was approved!\n\
         Please reach out to {} ({}) with any questions you might have.\n{}",
        approved.requester_name,
        shift.date,
        shift.area,
        shift.contact_name,
        shift.contact_email,
        SIGNATURE
    );

    notification(
        shift,
        NotificationKind::RequestApproved,
        recipients([
            approved.requester_email.as_str(),
            shift.contact_email.as_str(),
        ]),
        subject,
        body,
    )
}

/// One message to every passed requester, copied to the contact.
///
/// The contact alone still gets it when nobody was passed.
pub fn request_passed(shift: &Shift, passed: &[ShiftRequest]) -> Option<NotificationInput> {
    let subject = format!(
        "Sorry, request for the {} shift was approved for someone else",
        shift.date
    );
    let body = format!(
        "Thank you for submitting a request for the {} shift in the {} area.\n\
         Unfortunately this shift was given to someone else. Thanks again for your interest \
         in this shift and please do continue requesting more shifts. \
         We need all the help we can get.\n{}",
        shift.date, shift.area, SIGNATURE
    );

    let addresses = passed
        .iter()
        .map(|r| r.requester_email.as_str())
        .chain(std::iter::once(shift.contact_email.as_str()));

    notification(
        shift,
        NotificationKind::RequestPassed,
        recipients(addresses),
        subject,
        body,
    )
}
