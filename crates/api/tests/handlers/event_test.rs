use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use mockall::predicate;
use uuid::Uuid;

use bookline_api::middleware::error_handling::AppError;
use bookline_core::{
    errors::BookingError,
    models::{
        event::{EventResponse, PublishEventResponse},
        time_slot::TimeSlotResponse,
        user::Role,
    },
    validate,
};
use bookline_db::models::{DbEvent, DbTimeSlot};

use crate::test_utils::{sample_event, sample_slot, sample_user, TestContext};

// Wrapper mirroring create_event: role check, payload validation, then the
// event repository insert.
async fn test_create_event_wrapper(
    ctx: &mut TestContext,
    admin_id: Uuid,
    role: Role,
    title: String,
    event_date: String,
    slots: Vec<(String, String)>,
) -> Result<Json<EventResponse>, AppError> {
    if role != Role::Admin {
        return Err(AppError(BookingError::Authorization(
            "Admin role required".to_string(),
        )));
    }

    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(AppError(BookingError::Validation(
            "Title is required".to_string(),
        )));
    }

    let event_date = validate::parse_event_date(&event_date)?;
    if slots.is_empty() {
        return Err(AppError(BookingError::Validation(
            "At least one time slot is required".to_string(),
        )));
    }
    let slots = slots
        .iter()
        .map(|(start, end)| validate::parse_slot_times(start, end))
        .collect::<Result<Vec<_>, _>>()?;

    let title_static: &'static str = Box::leak(title.into_boxed_str());
    let (event, time_slots) = ctx
        .event_repo
        .create_event(admin_id, title_static, None, event_date, slots)
        .await?;

    Ok(Json(EventResponse {
        id: event.id,
        admin_id: event.admin_id,
        title: event.title.clone(),
        description: event.description.clone(),
        event_date: event.event_date,
        unique_url: event.unique_url.clone(),
        is_published: event.is_published,
        created_at: event.created_at,
        updated_at: event.updated_at,
        time_slots: Some(
            time_slots
                .iter()
                .map(|slot| TimeSlotResponse {
                    id: slot.id,
                    event_id: slot.event_id,
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    is_booked: slot.is_booked,
                    created_at: slot.created_at,
                })
                .collect(),
        ),
        bookings_count: None,
    }))
}

// Wrapper mirroring publish_event: ownership gate, then the flag update.
async fn test_publish_event_wrapper(
    ctx: &mut TestContext,
    event_id: Uuid,
    admin_id: Uuid,
    is_published: bool,
) -> Result<Json<PublishEventResponse>, AppError> {
    ctx.event_repo
        .get_event_for_admin(event_id, admin_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    let event = ctx
        .event_repo
        .set_published(event_id, is_published)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(PublishEventResponse {
        id: event.id,
        is_published: event.is_published,
    }))
}

fn created_event(admin_id: Uuid, title: &str, date: NaiveDate) -> (DbEvent, Vec<DbTimeSlot>) {
    let mut event = sample_event(admin_id, false);
    event.title = title.to_string();
    event.event_date = date;
    let slot = DbTimeSlot {
        id: Uuid::new_v4(),
        event_id: event.id,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        is_booked: false,
        created_at: chrono::Utc::now(),
    };
    (event, vec![slot])
}

#[tokio::test]
async fn test_create_event_success() {
    let mut ctx = TestContext::new();
    let admin = sample_user("admin");

    ctx.event_repo
        .expect_create_event()
        .with(
            predicate::eq(admin.id),
            predicate::eq("Signing Session"),
            predicate::eq(None::<&str>),
            predicate::eq(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()),
            predicate::always(),
        )
        .returning(|admin_id, title, _, date, _| Ok(created_event(admin_id, title, date)));

    let Json(response) = test_create_event_wrapper(
        &mut ctx,
        admin.id,
        Role::Admin,
        "Signing Session".to_string(),
        "2026-09-12".to_string(),
        vec![("10:00".to_string(), "10:30".to_string())],
    )
    .await
    .expect("create should succeed");

    assert_eq!(response.title, "Signing Session");
    assert!(!response.is_published);
    assert_eq!(response.time_slots.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_create_event_requires_admin_role() {
    let mut ctx = TestContext::new();

    let result = test_create_event_wrapper(
        &mut ctx,
        Uuid::new_v4(),
        Role::Fan,
        "Signing Session".to_string(),
        "2026-09-12".to_string(),
        vec![("10:00".to_string(), "10:30".to_string())],
    )
    .await;

    match result {
        Err(AppError(BookingError::Authorization(_))) => {}
        other => panic!("expected authorization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_event_rejects_bad_date() {
    let mut ctx = TestContext::new();

    let result = test_create_event_wrapper(
        &mut ctx,
        Uuid::new_v4(),
        Role::Admin,
        "Signing Session".to_string(),
        "12/09/2026".to_string(),
        vec![("10:00".to_string(), "10:30".to_string())],
    )
    .await;

    match result {
        Err(AppError(BookingError::Validation(_))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_event_rejects_empty_slots() {
    let mut ctx = TestContext::new();

    let result = test_create_event_wrapper(
        &mut ctx,
        Uuid::new_v4(),
        Role::Admin,
        "Signing Session".to_string(),
        "2026-09-12".to_string(),
        vec![],
    )
    .await;

    match result {
        Err(AppError(BookingError::Validation(_))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_event_rejects_inverted_slot() {
    let mut ctx = TestContext::new();

    let result = test_create_event_wrapper(
        &mut ctx,
        Uuid::new_v4(),
        Role::Admin,
        "Signing Session".to_string(),
        "2026-09-12".to_string(),
        vec![("11:00".to_string(), "10:30".to_string())],
    )
    .await;

    match result {
        Err(AppError(BookingError::Validation(_))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_publish_event_success() {
    let mut ctx = TestContext::new();
    let admin_id = Uuid::new_v4();
    let event = sample_event(admin_id, false);
    let event_id = event.id;

    let gate = event.clone();
    ctx.event_repo
        .expect_get_event_for_admin()
        .with(predicate::eq(event_id), predicate::eq(admin_id))
        .returning(move |_, _| Ok(Some(gate.clone())));

    ctx.event_repo
        .expect_set_published()
        .with(predicate::eq(event_id), predicate::eq(true))
        .returning(move |id, is_published| {
            let mut event = event.clone();
            event.id = id;
            event.is_published = is_published;
            Ok(event)
        });

    let Json(response) = test_publish_event_wrapper(&mut ctx, event_id, admin_id, true)
        .await
        .expect("publish should succeed");
    assert!(response.is_published);
}

#[tokio::test]
async fn test_publish_event_scoped_to_owner() {
    // Someone else's event looks like a missing event, not a forbidden one.
    let mut ctx = TestContext::new();

    ctx.event_repo
        .expect_get_event_for_admin()
        .returning(|_, _| Ok(None));

    let result = test_publish_event_wrapper(&mut ctx, Uuid::new_v4(), Uuid::new_v4(), true).await;
    match result {
        Err(AppError(BookingError::NotFound(_))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_open_slots_exclude_booked() {
    let mut ctx = TestContext::new();
    let event = sample_event(Uuid::new_v4(), true);
    let open = sample_slot(event.id, false);

    let open_clone = open.clone();
    ctx.time_slot_repo
        .expect_get_open_time_slots_by_event_id()
        .with(predicate::eq(event.id))
        .returning(move |_| Ok(vec![open_clone.clone()]));

    let slots = ctx
        .time_slot_repo
        .get_open_time_slots_by_event_id(event.id)
        .await
        .unwrap();
    assert_eq!(slots.len(), 1);
    assert!(!slots[0].is_booked);
}
