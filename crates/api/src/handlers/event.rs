//! Admin event management: CRUD, publishing, and booking reviews.

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveTime;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

use bookline_core::{
    errors::BookingError,
    models::{
        booking::BookingListResponse,
        event::{
            CreateEventRequest, EventListResponse, EventResponse, PageQuery, Pagination,
            PublishEventRequest, PublishEventResponse, UpdateEventRequest,
        },
        time_slot::{CreateTimeSlotRequest, TimeSlotResponse},
        user::MessageResponse,
    },
    validate,
};
use bookline_db::models::{DbEvent, DbTimeSlot};

use crate::{
    middleware::{
        auth::{self, AuthUser},
        error_handling::AppError,
        rate_limit::{self, Quota},
    },
    ApiState,
};

const WRITE_QUOTA: Quota = Quota::per_hour(30);
const LIST_QUOTA: Quota = Quota::per_hour(60);
const READ_QUOTA: Quota = Quota::per_hour(120);
const DELETE_QUOTA: Quota = Quota::per_hour(10);
const PUBLISH_QUOTA: Quota = Quota::per_hour(20);

pub(crate) fn slot_response(slot: &DbTimeSlot) -> TimeSlotResponse {
    TimeSlotResponse {
        id: slot.id,
        event_id: slot.event_id,
        start_time: slot.start_time,
        end_time: slot.end_time,
        is_booked: slot.is_booked,
        created_at: slot.created_at,
    }
}

pub(crate) fn event_response(
    event: &DbEvent,
    time_slots: Option<Vec<TimeSlotResponse>>,
    bookings_count: Option<i64>,
) -> EventResponse {
    EventResponse {
        id: event.id,
        admin_id: event.admin_id,
        title: event.title.clone(),
        description: event.description.clone(),
        event_date: event.event_date,
        unique_url: event.unique_url.clone(),
        is_published: event.is_published,
        created_at: event.created_at,
        updated_at: event.updated_at,
        time_slots,
        bookings_count,
    }
}

/// Parses and validates the slot list from a request payload.
fn parse_slots(slots: &[CreateTimeSlotRequest]) -> Result<Vec<(NaiveTime, NaiveTime)>, BookingError> {
    if slots.is_empty() {
        return Err(BookingError::Validation(
            "At least one time slot is required".to_string(),
        ));
    }

    slots
        .iter()
        .map(|slot| validate::parse_slot_times(&slot.start_time, &slot.end_time))
        .collect()
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:create:{}", addr.ip()),
        WRITE_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError(BookingError::Validation(
            "Title is required".to_string(),
        )));
    }

    let event_date = validate::parse_event_date(&payload.event_date)?;
    let slots = parse_slots(&payload.time_slots)?;
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let (event, time_slots) = bookline_db::repositories::event::create_event(
        &state.db_pool,
        user.id,
        &title,
        description,
        event_date,
        &slots,
    )
    .await?;

    let response = event_response(
        &event,
        Some(time_slots.iter().map(slot_response).collect()),
        None,
    );

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn list_events(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<EventListResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:list:{}", addr.ip()),
        LIST_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    let (page, per_page) = query.resolve();
    let (limit, offset) = query.limit_offset();

    let (events, total) = bookline_db::repositories::event::list_events_by_admin(
        &state.db_pool,
        user.id,
        limit,
        offset,
    )
    .await
    .map_err(BookingError::Database)?;

    let counts: HashMap<Uuid, i64> =
        bookline_db::repositories::event::count_bookings_by_event_for_admin(
            &state.db_pool,
            user.id,
        )
        .await
        .map_err(BookingError::Database)?
        .into_iter()
        .collect();

    let responses = events
        .iter()
        .map(|event| {
            let bookings_count = counts.get(&event.id).copied().unwrap_or(0);
            event_response(event, None, Some(bookings_count))
        })
        .collect();

    Ok(Json(EventListResponse {
        events: responses,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[axum::debug_handler]
pub async fn get_event(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:get:{}", addr.ip()),
        READ_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    let event = bookline_db::repositories::event::get_event_for_admin(&state.db_pool, id, user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    let time_slots =
        bookline_db::repositories::time_slot::get_time_slots_by_event_id(&state.db_pool, id)
            .await
            .map_err(BookingError::Database)?;

    let response = event_response(
        &event,
        Some(time_slots.iter().map(slot_response).collect()),
        None,
    );

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:update:{}", addr.ip()),
        WRITE_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    // Ownership gate before any mutation.
    bookline_db::repositories::event::get_event_for_admin(&state.db_pool, id, user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    let title = match &payload.title {
        Some(title) => {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError(BookingError::Validation(
                    "Title must not be empty".to_string(),
                )));
            }
            Some(title.to_string())
        }
        None => None,
    };

    let event_date = payload
        .event_date
        .as_deref()
        .map(validate::parse_event_date)
        .transpose()?;

    let slots = payload
        .time_slots
        .as_deref()
        .map(parse_slots)
        .transpose()?;

    let (event, time_slots) = bookline_db::repositories::event::update_event(
        &state.db_pool,
        id,
        title.as_deref(),
        payload.description.as_deref().map(str::trim),
        event_date,
        slots.as_deref(),
    )
    .await?;

    let response = event_response(
        &event,
        Some(time_slots.iter().map(slot_response).collect()),
        None,
    );

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:delete:{}", addr.ip()),
        DELETE_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    bookline_db::repositories::event::get_event_for_admin(&state.db_pool, id, user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    bookline_db::repositories::event::delete_event(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(MessageResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn publish_event(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishEventRequest>,
) -> Result<Json<PublishEventResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:publish:{}", addr.ip()),
        PUBLISH_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    bookline_db::repositories::event::get_event_for_admin(&state.db_pool, id, user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    let event =
        bookline_db::repositories::event::set_published(&state.db_pool, id, payload.is_published)
            .await
            .map_err(BookingError::Database)?;

    Ok(Json(PublishEventResponse {
        id: event.id,
        is_published: event.is_published,
    }))
}

#[axum::debug_handler]
pub async fn event_bookings(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<BookingListResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:bookings:{}", addr.ip()),
        LIST_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    bookline_db::repositories::event::get_event_for_admin(&state.db_pool, id, user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    let (page, per_page) = query.resolve();
    let (limit, offset) = query.limit_offset();

    let (bookings, total) = bookline_db::repositories::booking::list_bookings_by_event(
        &state.db_pool,
        id,
        limit,
        offset,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(BookingListResponse {
        bookings: bookings
            .iter()
            .map(super::booking::detail_response)
            .collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Bookings across every event of the authenticated admin.
#[axum::debug_handler]
pub async fn admin_bookings(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<BookingListResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("events:all-bookings:{}", addr.ip()),
        LIST_QUOTA,
    )
    .await?;
    auth::require_admin(&user)?;

    let (page, per_page) = query.resolve();
    let (limit, offset) = query.limit_offset();

    let (bookings, total) = bookline_db::repositories::booking::list_bookings_by_admin(
        &state.db_pool,
        user.id,
        limit,
        offset,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(BookingListResponse {
        bookings: bookings
            .iter()
            .map(super::booking::detail_response)
            .collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}
