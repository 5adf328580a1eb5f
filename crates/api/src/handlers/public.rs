//! Unauthenticated event pages, addressed by the event's unique URL slug.
//! Only published events are visible here.

use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;

use bookline_core::{
    errors::BookingError,
    models::{
        event::PublicEventResponse,
        time_slot::{PublicSlotsResponse, PublicTimeSlotResponse},
    },
};

use crate::{
    middleware::{
        error_handling::AppError,
        rate_limit::{self, Quota},
    },
    ApiState,
};

const PUBLIC_QUOTA: Quota = Quota::per_hour(120);

#[axum::debug_handler]
pub async fn get_public_event(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(unique_url): Path<String>,
) -> Result<Json<PublicEventResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("public:event:{}", addr.ip()),
        PUBLIC_QUOTA,
    )
    .await?;

    let event =
        bookline_db::repositories::event::get_published_event_by_url(&state.db_pool, &unique_url)
            .await
            .map_err(BookingError::Database)?
            .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    Ok(Json(PublicEventResponse {
        id: event.id,
        title: event.title,
        description: event.description,
        event_date: event.event_date,
        unique_url: event.unique_url,
    }))
}

#[axum::debug_handler]
pub async fn get_public_event_slots(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(unique_url): Path<String>,
) -> Result<Json<PublicSlotsResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("public:slots:{}", addr.ip()),
        PUBLIC_QUOTA,
    )
    .await?;

    let event =
        bookline_db::repositories::event::get_published_event_by_url(&state.db_pool, &unique_url)
            .await
            .map_err(BookingError::Database)?
            .ok_or_else(|| BookingError::NotFound("Event not found".to_string()))?;

    let slots = bookline_db::repositories::time_slot::get_open_time_slots_by_event_id(
        &state.db_pool,
        event.id,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(PublicSlotsResponse {
        time_slots: slots
            .into_iter()
            .map(|slot| PublicTimeSlotResponse {
                id: slot.id,
                start_time: slot.start_time,
                end_time: slot.end_time,
            })
            .collect(),
    }))
}
