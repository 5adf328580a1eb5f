//! The booking ledger: slot/booking exclusivity.
//!
//! Reservation combines an application-level `is_booked` check with the
//! `unique_time_slot_booking` constraint on `bookings.time_slot_id`. Two
//! transactions can both observe an open slot; the constraint rejects the
//! second insert at commit, and that rejection is reported as the same
//! conflict as the application-level check. No in-process locks are taken.

use crate::models::{DbBooking, DbBookingDetail, DbEvent, DbTimeSlot};
use bookline_core::errors::{BookingError, BookingResult};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Outcome of a successful reservation, with the slot and event rows the
/// caller needs for the response body and notification emails.
#[derive(Debug, Clone)]
pub struct ReservedSlot {
    pub booking: DbBooking,
    pub slot: DbTimeSlot,
    pub event: DbEvent,
}

/// Outcome of a successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelledSlot {
    pub booking: DbBooking,
    pub slot: DbTimeSlot,
    pub event: DbEvent,
}

fn db_err(err: sqlx::Error) -> BookingError {
    BookingError::Database(eyre::Report::new(err))
}

fn map_reserve_insert_error(err: sqlx::Error) -> BookingError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            BookingError::Conflict("Time slot already booked".to_string())
        }
        _ => db_err(err),
    }
}

/// Reserves an open slot for a fan.
///
/// Preconditions checked in order: the slot exists (`NotFound`), its event
/// is published (`Validation`), and the slot is still open (`Conflict`).
/// Everything commits atomically or not at all.
pub async fn reserve_slot(
    pool: &Pool<Postgres>,
    time_slot_id: Uuid,
    fan_id: Uuid,
    fan_name: &str,
    fan_email: &str,
    fan_phone: &str,
) -> BookingResult<ReservedSlot> {
    tracing::debug!(
        "Reserving slot: time_slot_id={}, fan_id={}",
        time_slot_id,
        fan_id
    );

    let mut tx = pool.begin().await.map_err(db_err)?;

    let slot = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        SELECT id, event_id, start_time, end_time, is_booked, created_at
        FROM time_slots
        WHERE id = $1
        "#,
    )
    .bind(time_slot_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_err)?
    .ok_or_else(|| BookingError::NotFound("Time slot not found".to_string()))?;

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, admin_id, title, description, event_date, unique_url,
               is_published, created_at, updated_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(slot.event_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    if !event.is_published {
        return Err(BookingError::Validation(
            "Cannot book an unpublished event".to_string(),
        ));
    }

    if slot.is_booked {
        return Err(BookingError::Conflict(
            "Time slot already booked".to_string(),
        ));
    }

    // Race window closes here: a concurrent insert for the same slot makes
    // this one fail the unique constraint, which maps to the same Conflict.
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (id, time_slot_id, fan_id, fan_name, fan_email, fan_phone, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, time_slot_id, fan_id, fan_name, fan_email, fan_phone, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(time_slot_id)
    .bind(fan_id)
    .bind(fan_name)
    .bind(fan_email)
    .bind(fan_phone)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(map_reserve_insert_error)?;

    let slot = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        UPDATE time_slots
        SET is_booked = TRUE
        WHERE id = $1
        RETURNING id, event_id, start_time, end_time, is_booked, created_at
        "#,
    )
    .bind(time_slot_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    tx.commit().await.map_err(db_err)?;

    tracing::debug!("Slot reserved: booking_id={}", booking.id);
    Ok(ReservedSlot {
        booking,
        slot,
        event,
    })
}

/// Cancels a booking owned by `fan_id` and reopens its slot.
///
/// A booking that does not exist and a booking owned by someone else are
/// deliberately the same `NotFound`; the response must not leak existence.
pub async fn cancel_booking(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
    fan_id: Uuid,
) -> BookingResult<CancelledSlot> {
    tracing::debug!("Cancelling booking: id={}, fan_id={}", booking_id, fan_id);

    let mut tx = pool.begin().await.map_err(db_err)?;

    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        DELETE FROM bookings
        WHERE id = $1 AND fan_id = $2
        RETURNING id, time_slot_id, fan_id, fan_name, fan_email, fan_phone, created_at
        "#,
    )
    .bind(booking_id)
    .bind(fan_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_err)?
    .ok_or_else(|| BookingError::NotFound("Booking not found".to_string()))?;

    let slot = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        UPDATE time_slots
        SET is_booked = FALSE
        WHERE id = $1
        RETURNING id, event_id, start_time, end_time, is_booked, created_at
        "#,
    )
    .bind(booking.time_slot_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, admin_id, title, description, event_date, unique_url,
               is_published, created_at, updated_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(slot.event_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    tx.commit().await.map_err(db_err)?;

    tracing::debug!("Booking cancelled: id={}", booking_id);
    Ok(CancelledSlot {
        booking,
        slot,
        event,
    })
}

const DETAIL_COLUMNS: &str = r#"
    b.id, b.time_slot_id, b.fan_id, b.fan_name, b.fan_email, b.fan_phone, b.created_at,
    ts.start_time, ts.end_time,
    e.id AS event_id, e.title AS event_title, e.event_date, e.admin_id AS event_admin_id
"#;

pub async fn get_booking_detail(
    pool: &Pool<Postgres>,
    booking_id: Uuid,
) -> Result<Option<DbBookingDetail>> {
    let detail = sqlx::query_as::<_, DbBookingDetail>(&format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM bookings b
        JOIN time_slots ts ON ts.id = b.time_slot_id
        JOIN events e ON e.id = ts.event_id
        WHERE b.id = $1
        "#
    ))
    .bind(booking_id)
    .fetch_optional(pool)
    .await?;

    Ok(detail)
}

pub async fn list_bookings_by_fan(
    pool: &Pool<Postgres>,
    fan_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<(Vec<DbBookingDetail>, i64)> {
    let bookings = sqlx::query_as::<_, DbBookingDetail>(&format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM bookings b
        JOIN time_slots ts ON ts.id = b.time_slot_id
        JOIN events e ON e.id = ts.event_id
        WHERE b.fan_id = $1
        ORDER BY b.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(fan_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM bookings WHERE fan_id = $1
        "#,
    )
    .bind(fan_id)
    .fetch_one(pool)
    .await?;

    Ok((bookings, total))
}

pub async fn list_bookings_by_event(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<(Vec<DbBookingDetail>, i64)> {
    let bookings = sqlx::query_as::<_, DbBookingDetail>(&format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM bookings b
        JOIN time_slots ts ON ts.id = b.time_slot_id
        JOIN events e ON e.id = ts.event_id
        WHERE ts.event_id = $1
        ORDER BY b.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(event_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings b
        JOIN time_slots ts ON ts.id = b.time_slot_id
        WHERE ts.event_id = $1
        "#,
    )
    .bind(event_id)
    .fetch_one(pool)
    .await?;

    Ok((bookings, total))
}

/// Bookings across every event owned by one admin, newest first.
pub async fn list_bookings_by_admin(
    pool: &Pool<Postgres>,
    admin_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<(Vec<DbBookingDetail>, i64)> {
    let bookings = sqlx::query_as::<_, DbBookingDetail>(&format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM bookings b
        JOIN time_slots ts ON ts.id = b.time_slot_id
        JOIN events e ON e.id = ts.event_id
        WHERE e.admin_id = $1
        ORDER BY b.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(admin_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings b
        JOIN time_slots ts ON ts.id = b.time_slot_id
        JOIN events e ON e.id = ts.event_id
        WHERE e.admin_id = $1
        "#,
    )
    .bind(admin_id)
    .fetch_one(pool)
    .await?;

    Ok((bookings, total))
}
