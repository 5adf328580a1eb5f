use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEvent {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub unique_url: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimeSlot {
    pub id: Uuid,
    pub event_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub time_slot_id: Uuid,
    pub fan_id: Uuid,
    pub fan_name: String,
    pub fan_email: String,
    pub fan_phone: String,
    pub created_at: DateTime<Utc>,
}

/// Booking row joined with its slot and event, as returned by the
/// list/detail queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingDetail {
    pub id: Uuid,
    pub time_slot_id: Uuid,
    pub fan_id: Uuid,
    pub fan_name: String,
    pub fan_email: String,
    pub fan_phone: String,
    pub created_at: DateTime<Utc>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_admin_id: Uuid,
}
