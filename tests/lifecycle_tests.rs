use pretty_assertions::assert_eq;

use shift_helper::AppError;
use shift_helper::database::models::{NotificationKind, RequestStatus, ShiftStatus};
use shift_helper::database::repositories::{NotificationRepository, ShiftRequestRepository};

mod common;
use common::{MockData, TestContext, days_from_today};

#[tokio::test]
async fn test_post_shift_starts_posted() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;

    let shift = ctx
        .state
        .scheduling_service
        .post_shift(org.id, MockData::shift(" ICU ", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();

    assert_eq!(shift.status, ShiftStatus::Posted);
    assert_eq!(shift.area, "ICU");
    assert_eq!(shift.organization_id, org.id);
    assert_eq!(shift.picked_up_by, None);
    assert_eq!(shift.approved_at, None);
    assert_eq!(shift.created_at, shift.updated_at);
}

#[tokio::test]
async fn test_post_shift_requires_fields() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;

    let mut input = MockData::shift("ICU", "RN", days_from_today(3), "7am");
    input.end_time = "   ".to_string();

    let err = ctx
        .state
        .scheduling_service
        .post_shift(org.id, input)
        .await
        .unwrap_err();

    match err {
        AppError::BadRequest(message) => assert_eq!(message, "Shift end time is required"),
        other => panic!("expected BadRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_contact_email_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;

    let mut input = MockData::shift("ICU", "RN", days_from_today(3), "7am");
    input.contact_email = "casey at mercy".to_string();

    match service.post_shift(org.id, input.clone()).await.unwrap_err() {
        AppError::BadRequest(message) => {
            assert_eq!(message, "Contact email address is not valid")
        }
        other => panic!("expected BadRequest, got {other:?}"),
    }

    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    assert!(matches!(
        service.edit_shift(org.id, shift.id, input).await,
        Err(AppError::BadRequest(_))
    ));

    // no contact at all is still allowed
    let mut input = MockData::shift("ICU", "RN", days_from_today(3), "7am");
    input.contact_email = "  ".to_string();
    let shift = service.post_shift(org.id, input).await.unwrap();
    assert_eq!(shift.contact_email, "");
}

#[tokio::test]
async fn test_submit_request_moves_shift_and_queues_notice() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;

    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();

    let request = service
        .submit_request(shift.id, MockData::request_from("dana@mercy.org"))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Requested);
    assert_eq!(request.organization_id, org.id);
    assert_eq!(request.approved_at, None);

    let shift = service.get_shift(shift.id).await.unwrap();
    assert_eq!(shift.status, ShiftStatus::Requested);

    let notifications = NotificationRepository::new(ctx.db.pool.clone())
        .list_for_shift(shift.id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::ShiftRequested);
    assert_eq!(notifications[0].recipients.0, vec!["casey@mercy.org".to_string()]);
    assert!(notifications[0].body.contains("dana@mercy.org"));

    // a second request keeps it Requested
    service
        .submit_request(shift.id, MockData::request())
        .await
        .unwrap();
    let shift = service.get_shift(shift.id).await.unwrap();
    assert_eq!(shift.status, ShiftStatus::Requested);
}

#[tokio::test]
async fn test_submit_request_validates_requester() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;
    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();

    let mut input = MockData::request();
    input.requester_email = "not-an-email".to_string();
    assert!(matches!(
        service.submit_request(shift.id, input).await,
        Err(AppError::BadRequest(_))
    ));

    let mut input = MockData::request();
    input.requester_name = " ".to_string();
    assert!(matches!(
        service.submit_request(shift.id, input).await,
        Err(AppError::BadRequest(_))
    ));

    assert!(matches!(
        service.submit_request(9999, MockData::request()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_approve_request_passes_everyone_else() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;
    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();

    let first = service
        .submit_request(shift.id, MockData::request_from("first@mercy.org"))
        .await
        .unwrap();
    let chosen = service
        .submit_request(shift.id, MockData::request_from("chosen@mercy.org"))
        .await
        .unwrap();
    let third = service
        .submit_request(shift.id, MockData::request_from("third@mercy.org"))
        .await
        .unwrap();

    let outcome = service
        .approve_request(org.id, shift.id, chosen.id)
        .await
        .unwrap();

    assert_eq!(outcome.shift.status, ShiftStatus::Approved);
    assert_eq!(outcome.shift.picked_up_by.as_deref(), Some("chosen@mercy.org"));
    assert!(outcome.shift.approved_at.is_some());
    assert_eq!(outcome.approved.id, chosen.id);
    assert_eq!(outcome.approved.status, RequestStatus::Approved);
    assert_eq!(outcome.approved.approved_at, outcome.shift.approved_at);
    assert_eq!(
        outcome.passed.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![first.id, third.id]
    );
    assert!(outcome.passed.iter().all(|r| r.status == RequestStatus::Passed));

    let requests = service
        .list_requests_for_shift(org.id, shift.id)
        .await
        .unwrap();
    let approved = requests
        .iter()
        .filter(|r| r.request.status == RequestStatus::Approved)
        .count();
    assert_eq!(approved, 1);

    let notifications = NotificationRepository::new(ctx.db.pool.clone())
        .list_for_shift(shift.id)
        .await
        .unwrap();
    let kinds: Vec<_> = notifications.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::ShiftRequested,
            NotificationKind::ShiftRequested,
            NotificationKind::ShiftRequested,
            NotificationKind::RequestApproved,
            NotificationKind::RequestPassed,
        ]
    );
    assert_eq!(
        notifications[3].recipients.0,
        vec!["chosen@mercy.org".to_string(), "casey@mercy.org".to_string()]
    );
    assert_eq!(
        notifications[4].recipients.0,
        vec![
            "first@mercy.org".to_string(),
            "third@mercy.org".to_string(),
            "casey@mercy.org".to_string()
        ]
    );
}

#[tokio::test]
async fn test_second_approval_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;
    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    let a = service.submit_request(shift.id, MockData::request()).await.unwrap();
    let b = service.submit_request(shift.id, MockData::request()).await.unwrap();

    service.approve_request(org.id, shift.id, a.id).await.unwrap();

    // b was passed by the first approval
    assert!(matches!(
        service.approve_request(org.id, shift.id, b.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        service.approve_request(org.id, shift.id, a.id).await,
        Err(AppError::Conflict(_))
    ));

    let requests = ShiftRequestRepository::new(ctx.db.pool.clone())
        .list_for_shift(shift.id)
        .await
        .unwrap();
    let statuses: Vec<_> = requests.iter().map(|r| r.request.status).collect();
    assert_eq!(statuses, vec![RequestStatus::Approved, RequestStatus::Passed]);
}

#[tokio::test]
async fn test_concurrent_approvals_have_one_winner() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = ctx.state.scheduling_service.clone();
    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    let a = service.submit_request(shift.id, MockData::request()).await.unwrap();
    let b = service.submit_request(shift.id, MockData::request()).await.unwrap();

    let (first, second) = tokio::join!(
        service.approve_request(org.id, shift.id, a.id),
        service.approve_request(org.id, shift.id, b.id)
    );

    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );

    let shift = service.get_shift(shift.id).await.unwrap();
    assert_eq!(shift.status, ShiftStatus::Approved);
    let requests = service.list_requests_for_shift(org.id, shift.id).await.unwrap();
    assert_eq!(
        requests
            .iter()
            .filter(|r| r.request.status == RequestStatus::Approved)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_approve_request_checks_ownership() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let other = ctx.signup("other-admin", "other-staff").await.organization;
    let service = &ctx.state.scheduling_service;

    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    let sibling = service
        .post_shift(org.id, MockData::shift("ER", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    let request = service.submit_request(sibling.id, MockData::request()).await.unwrap();

    assert!(matches!(
        service.approve_request(org.id, shift.id, request.id).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        service.approve_request(org.id, shift.id, 9999).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.approve_request(other.id, sibling.id, request.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.get_request(other.id, request.id).await,
        Err(AppError::NotFound(_))
    ));

    let detail = service.get_request(org.id, request.id).await.unwrap();
    assert_eq!(detail.shift.id, sibling.id);
    assert_eq!(detail.request.id, request.id);
}

#[tokio::test]
async fn test_terminal_shifts_reject_requests() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;

    let approved = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    let winner = service.submit_request(approved.id, MockData::request()).await.unwrap();
    service
        .approve_request(org.id, approved.id, winner.id)
        .await
        .unwrap();

    let removed = service
        .post_shift(org.id, MockData::shift("ER", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    service.remove_shift(org.id, removed.id).await.unwrap();

    for shift_id in [approved.id, removed.id] {
        assert!(matches!(
            service.submit_request(shift_id, MockData::request()).await,
            Err(AppError::Conflict(_))
        ));
    }

    let approved_requests = service
        .list_requests_for_shift(org.id, approved.id)
        .await
        .unwrap();
    assert_eq!(approved_requests.len(), 1);
    let removed_requests = service
        .list_requests_for_shift(org.id, removed.id)
        .await
        .unwrap();
    assert!(removed_requests.is_empty());
}

#[tokio::test]
async fn test_remove_shift_is_soft_and_final() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;
    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();
    let request = service.submit_request(shift.id, MockData::request()).await.unwrap();

    let removed = service.remove_shift(org.id, shift.id).await.unwrap();
    assert_eq!(removed.status, ShiftStatus::Removed);

    assert!(matches!(
        service.remove_shift(org.id, shift.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        service.approve_request(org.id, shift.id, request.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        service
            .edit_shift(
                org.id,
                shift.id,
                MockData::shift("ICU", "RN", days_from_today(4), "7am")
            )
            .await,
        Err(AppError::Conflict(_))
    ));

    // requests are left alone
    let requests = service.list_requests_for_shift(org.id, shift.id).await.unwrap();
    assert_eq!(requests[0].request.status, RequestStatus::Requested);

    assert!(matches!(
        service.remove_shift(org.id, 9999).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_edit_shift_overwrites_details() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;
    let shift = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(3), "7am"))
        .await
        .unwrap();

    let mut input = MockData::shift("PACU", "CNA", days_from_today(5), "3pm");
    input.comments = None;
    let edited = service.edit_shift(org.id, shift.id, input).await.unwrap();

    assert_eq!(edited.id, shift.id);
    assert_eq!(edited.area, "PACU");
    assert_eq!(edited.role, "CNA");
    assert_eq!(edited.date, days_from_today(5));
    assert_eq!(edited.start_time, "3pm");
    assert_eq!(edited.comments, None);
    assert_eq!(edited.status, ShiftStatus::Posted);
    assert!(edited.updated_at >= shift.updated_at);
}

#[tokio::test]
async fn test_open_list_filters_and_orders() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let other = ctx.signup("other-admin", "other-staff").await.organization;
    let service = &ctx.state.scheduling_service;

    let later = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(5), "7am"))
        .await
        .unwrap();
    let soon_er = service
        .post_shift(org.id, MockData::shift("ER", "RN", days_from_today(1), "7am"))
        .await
        .unwrap();
    let soon_cna = service
        .post_shift(org.id, MockData::shift("ER", "CNA", days_from_today(1), "7am"))
        .await
        .unwrap();
    let past = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(-2), "7am"))
        .await
        .unwrap();
    let removed = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(2), "7am"))
        .await
        .unwrap();
    service.remove_shift(org.id, removed.id).await.unwrap();
    service
        .post_shift(other.id, MockData::shift("ICU", "RN", days_from_today(2), "7am"))
        .await
        .unwrap();

    let open = service
        .list_open_shifts(org.id, days_from_today(0))
        .await
        .unwrap();
    let ids: Vec<_> = open.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![soon_cna.id, soon_er.id, later.id]);

    // an earlier as_of brings the past shift back
    let open = service
        .list_open_shifts(org.id, days_from_today(-7))
        .await
        .unwrap();
    assert_eq!(open[0].id, past.id);
}

#[tokio::test]
async fn test_pending_list_counts_requests() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;

    let icu = service
        .post_shift(org.id, MockData::shift("ICU", "RN", days_from_today(1), "7am"))
        .await
        .unwrap();
    let er = service
        .post_shift(org.id, MockData::shift("ER", "RN", days_from_today(4), "7am"))
        .await
        .unwrap();
    service.submit_request(icu.id, MockData::request()).await.unwrap();
    service.submit_request(icu.id, MockData::request()).await.unwrap();

    let pending = service
        .list_pending_with_request_counts(org.id, days_from_today(0))
        .await
        .unwrap();

    let rows: Vec<_> = pending
        .iter()
        .map(|p| (p.shift.id, p.request_count))
        .collect();
    assert_eq!(rows, vec![(er.id, 0), (icu.id, 2)]);
}

#[tokio::test]
async fn test_history_lists_approved_by_picker() {
    let ctx = TestContext::new().await.unwrap();
    let org = ctx.signup("admin-secret", "staff-secret").await.organization;
    let service = &ctx.state.scheduling_service;

    let mut expected = Vec::new();
    for (area, email) in [("ICU", "zoe@mercy.org"), ("ER", "amy@mercy.org")] {
        let shift = service
            .post_shift(org.id, MockData::shift(area, "RN", days_from_today(2), "7am"))
            .await
            .unwrap();
        let request = service
            .submit_request(shift.id, MockData::request_from(email))
            .await
            .unwrap();
        service
            .approve_request(org.id, shift.id, request.id)
            .await
            .unwrap();
        expected.push((email.to_string(), shift.id));
    }
    service
        .post_shift(org.id, MockData::shift("OR", "RN", days_from_today(2), "7am"))
        .await
        .unwrap();

    let history = service.list_history(org.id).await.unwrap();
    let rows: Vec<_> = history
        .iter()
        .map(|s| (s.picked_up_by.clone().unwrap_or_default(), s.id))
        .collect();

    expected.sort();
    assert_eq!(rows, expected);
}
