//! Fan-facing booking operations backed by the booking ledger.

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

use bookline_core::{
    errors::BookingError,
    models::{
        booking::{
            BookingListResponse, BookingResponse, CancelBookingResponse, CreateBookingRequest,
        },
        event::{EventSummary, PageQuery, Pagination},
        time_slot::TimeSlotSummary,
        user::Role,
    },
    validate,
};
use bookline_db::models::DbBookingDetail;

use crate::{
    middleware::{
        auth::{self, AuthUser},
        error_handling::AppError,
        rate_limit::{self, Quota},
    },
    notifier::Notification,
    ApiState,
};

const CREATE_QUOTA: Quota = Quota::per_hour(30);
const LIST_QUOTA: Quota = Quota::per_hour(60);
const READ_QUOTA: Quota = Quota::per_hour(120);
const CANCEL_QUOTA: Quota = Quota::per_hour(10);

pub(crate) fn detail_response(detail: &DbBookingDetail) -> BookingResponse {
    BookingResponse {
        id: detail.id,
        time_slot_id: detail.time_slot_id,
        fan_id: detail.fan_id,
        fan_name: detail.fan_name.clone(),
        fan_email: detail.fan_email.clone(),
        fan_phone: detail.fan_phone.clone(),
        created_at: detail.created_at,
        event: EventSummary {
            id: detail.event_id,
            title: detail.event_title.clone(),
            event_date: detail.event_date,
        },
        time_slot: TimeSlotSummary {
            start_time: detail.start_time,
            end_time: detail.end_time,
        },
    }
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("bookings:create:{}", addr.ip()),
        CREATE_QUOTA,
    )
    .await?;
    auth::require_fan(&user)?;

    let fan_name = payload.fan_name.trim().to_string();
    let fan_email = payload.fan_email.trim().to_lowercase();
    let fan_phone = payload.fan_phone.trim().to_string();
    validate::validate_name(&fan_name)?;
    validate::validate_email(&fan_email)?;
    validate::validate_phone(&fan_phone)?;

    let reserved = bookline_db::repositories::booking::reserve_slot(
        &state.db_pool,
        payload.time_slot_id,
        user.id,
        &fan_name,
        &fan_email,
        &fan_phone,
    )
    .await?;

    state.notifier.notify(Notification::BookingConfirmedFan {
        to: fan_email.clone(),
        fan_name: fan_name.clone(),
        event_title: reserved.event.title.clone(),
        event_date: reserved.event.event_date,
        start_time: reserved.slot.start_time,
        end_time: reserved.slot.end_time,
    });

    // Alert the event owner as well; a missing admin row is a data bug
    // worth logging, not a reason to fail the booking.
    match bookline_db::repositories::user::get_user_by_id(&state.db_pool, reserved.event.admin_id)
        .await
    {
        Ok(Some(admin)) => state.notifier.notify(Notification::BookingAlertAdmin {
            to: admin.email,
            admin_name: admin.name,
            fan_name: fan_name.clone(),
            fan_email: fan_email.clone(),
            fan_phone: fan_phone.clone(),
            event_title: reserved.event.title.clone(),
            event_date: reserved.event.event_date,
            start_time: reserved.slot.start_time,
            end_time: reserved.slot.end_time,
        }),
        Ok(None) => tracing::warn!(
            "Admin {} missing for event {}",
            reserved.event.admin_id,
            reserved.event.id
        ),
        Err(err) => tracing::warn!("Failed to load admin for booking alert: {err}"),
    }

    let response = BookingResponse {
        id: reserved.booking.id,
        time_slot_id: reserved.booking.time_slot_id,
        fan_id: reserved.booking.fan_id,
        fan_name: reserved.booking.fan_name.clone(),
        fan_email: reserved.booking.fan_email.clone(),
        fan_phone: reserved.booking.fan_phone.clone(),
        created_at: reserved.booking.created_at,
        event: EventSummary {
            id: reserved.event.id,
            title: reserved.event.title.clone(),
            event_date: reserved.event.event_date,
        },
        time_slot: TimeSlotSummary {
            start_time: reserved.slot.start_time,
            end_time: reserved.slot.end_time,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<BookingListResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("bookings:list:{}", addr.ip()),
        LIST_QUOTA,
    )
    .await?;
    auth::require_fan(&user)?;

    let (page, per_page) = query.resolve();
    let (limit, offset) = query.limit_offset();

    let (bookings, total) = bookline_db::repositories::booking::list_bookings_by_fan(
        &state.db_pool,
        user.id,
        limit,
        offset,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(BookingListResponse {
        bookings: bookings.iter().map(detail_response).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// A fan may read their own booking; an admin may read bookings against
/// their own events. Everyone else gets a 403.
#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("bookings:get:{}", addr.ip()),
        READ_QUOTA,
    )
    .await?;

    let detail = bookline_db::repositories::booking::get_booking_detail(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;

    let allowed = match user.role {
        Role::Fan => detail.fan_id == user.id,
        Role::Admin => detail.event_admin_id == user.id,
    };
    if !allowed {
        return Err(AppError(BookingError::Authorization(
            "Not authorized to view this booking".to_string(),
        )));
    }

    Ok(Json(detail_response(&detail)))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("bookings:cancel:{}", addr.ip()),
        CANCEL_QUOTA,
    )
    .await?;
    auth::require_fan(&user)?;

    let cancelled =
        bookline_db::repositories::booking::cancel_booking(&state.db_pool, id, user.id).await?;

    state.notifier.notify(Notification::BookingCancelled {
        to: cancelled.booking.fan_email.clone(),
        user_name: cancelled.booking.fan_name.clone(),
        event_title: cancelled.event.title.clone(),
        event_date: cancelled.event.event_date,
        start_time: cancelled.slot.start_time,
        end_time: cancelled.slot.end_time,
    });

    Ok(Json(CancelBookingResponse {
        message: "Booking cancelled successfully".to_string(),
    }))
}
