use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable interval `[start_time, end_time)` within one event's day.
/// At most one booking may reference a slot at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub event_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeSlotRequest {
    /// Slot start in `HH:MM` wall-clock time.
    pub start_time: String,
    /// Slot end in `HH:MM` wall-clock time, must be after start.
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

/// Slot view exposed on public event pages. Booking state is omitted;
/// public listings only ever contain open slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicTimeSlotResponse {
    pub id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Summary embedded in booking responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotSummary {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicSlotsResponse {
    pub time_slots: Vec<PublicTimeSlotResponse>,
}
