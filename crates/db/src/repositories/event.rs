use crate::models::{DbEvent, DbTimeSlot};
use bookline_core::errors::{BookingError, BookingResult};
use chrono::{NaiveDate, NaiveTime, Utc};
use eyre::Result;
use rand::RngCore;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Random url-safe token identifying an event's public page.
fn generate_unique_url() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn db_err(err: sqlx::Error) -> BookingError {
    BookingError::Database(eyre::Report::new(err))
}

/// Maps a unique violation on (event_id, start_time, end_time) to a
/// validation failure; the payload named the same interval twice.
fn map_slot_insert_error(err: sqlx::Error) -> BookingError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            BookingError::Validation("Duplicate time slot for this event".to_string())
        }
        _ => db_err(err),
    }
}

/// Creates an event together with its initial slots in one transaction.
pub async fn create_event(
    pool: &Pool<Postgres>,
    admin_id: Uuid,
    title: &str,
    description: Option<&str>,
    event_date: NaiveDate,
    slots: &[(NaiveTime, NaiveTime)],
) -> BookingResult<(DbEvent, Vec<DbTimeSlot>)> {
    let id = Uuid::new_v4();
    let unique_url = generate_unique_url();
    let now = Utc::now();

    tracing::debug!(
        "Creating event: id={}, admin_id={}, slots={}",
        id,
        admin_id,
        slots.len()
    );

    let mut tx = pool.begin().await.map_err(db_err)?;

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        INSERT INTO events (id, admin_id, title, description, event_date, unique_url,
                            is_published, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $7)
        RETURNING id, admin_id, title, description, event_date, unique_url,
                  is_published, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(admin_id)
    .bind(title)
    .bind(description)
    .bind(event_date)
    .bind(&unique_url)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    let mut created_slots = Vec::with_capacity(slots.len());
    for (start_time, end_time) in slots {
        let slot = insert_slot(&mut tx, event.id, *start_time, *end_time).await?;
        created_slots.push(slot);
    }

    tx.commit().await.map_err(db_err)?;

    tracing::debug!("Event created successfully: id={}", event.id);
    Ok((event, created_slots))
}

async fn insert_slot(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    event_id: Uuid,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> BookingResult<DbTimeSlot> {
    let slot = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        INSERT INTO time_slots (id, event_id, start_time, end_time, is_booked, created_at)
        VALUES ($1, $2, $3, $4, FALSE, $5)
        RETURNING id, event_id, start_time, end_time, is_booked, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(start_time)
    .bind(end_time)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await
    .map_err(map_slot_insert_error)?;

    Ok(slot)
}

pub async fn get_event_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbEvent>> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, admin_id, title, description, event_date, unique_url,
               is_published, created_at, updated_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Scoped lookup used by every admin operation: an event belonging to a
/// different admin is indistinguishable from a missing one.
pub async fn get_event_for_admin(
    pool: &Pool<Postgres>,
    id: Uuid,
    admin_id: Uuid,
) -> Result<Option<DbEvent>> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, admin_id, title, description, event_date, unique_url,
               is_published, created_at, updated_at
        FROM events
        WHERE id = $1 AND admin_id = $2
        "#,
    )
    .bind(id)
    .bind(admin_id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

pub async fn list_events_by_admin(
    pool: &Pool<Postgres>,
    admin_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<(Vec<DbEvent>, i64)> {
    let events = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, admin_id, title, description, event_date, unique_url,
               is_published, created_at, updated_at
        FROM events
        WHERE admin_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(admin_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM events WHERE admin_id = $1
        "#,
    )
    .bind(admin_id)
    .fetch_one(pool)
    .await?;

    Ok((events, total))
}

/// Booking counts for every event of one admin, grouped in a single query.
/// Events without bookings are absent from the result.
pub async fn count_bookings_by_event_for_admin(
    pool: &Pool<Postgres>,
    admin_id: Uuid,
) -> Result<Vec<(Uuid, i64)>> {
    let counts = sqlx::query_as::<_, (Uuid, i64)>(
        r#"
        SELECT ts.event_id, COUNT(b.id)
        FROM bookings b
        JOIN time_slots ts ON ts.id = b.time_slot_id
        JOIN events e ON e.id = ts.event_id
        WHERE e.admin_id = $1
        GROUP BY ts.event_id
        "#,
    )
    .bind(admin_id)
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// Updates event fields and, if `slots` is provided, replaces the slot set
/// wholesale. Bookings on removed slots cascade-delete with their slots.
pub async fn update_event(
    pool: &Pool<Postgres>,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    event_date: Option<NaiveDate>,
    slots: Option<&[(NaiveTime, NaiveTime)]>,
) -> BookingResult<(DbEvent, Vec<DbTimeSlot>)> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        UPDATE events
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            event_date = COALESCE($4, event_date),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, admin_id, title, description, event_date, unique_url,
                  is_published, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(event_date)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;

    if let Some(slots) = slots {
        sqlx::query(
            r#"
            DELETE FROM time_slots WHERE event_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        for (start_time, end_time) in slots {
            insert_slot(&mut tx, id, *start_time, *end_time).await?;
        }
    }

    tx.commit().await.map_err(db_err)?;

    let time_slots = super::time_slot::get_time_slots_by_event_id(pool, id)
        .await
        .map_err(BookingError::Database)?;

    Ok((event, time_slots))
}

pub async fn delete_event(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    // Slots and bookings cascade with the event row.
    sqlx::query(
        r#"
        DELETE FROM events WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_published(
    pool: &Pool<Postgres>,
    id: Uuid,
    is_published: bool,
) -> Result<DbEvent> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        UPDATE events
        SET is_published = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, admin_id, title, description, event_date, unique_url,
                  is_published, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(is_published)
    .fetch_one(pool)
    .await?;

    Ok(event)
}

pub async fn get_published_event_by_url(
    pool: &Pool<Postgres>,
    unique_url: &str,
) -> Result<Option<DbEvent>> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, admin_id, title, description, event_date, unique_url,
               is_published, created_at, updated_at
        FROM events
        WHERE unique_url = $1 AND is_published = TRUE
        "#,
    )
    .bind(unique_url)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}
