use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{EventSummary, Pagination};
use super::time_slot::TimeSlotSummary;

/// A reservation held by one fan against exactly one time slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub time_slot_id: Uuid,
    pub fan_id: Uuid,
    pub fan_name: String,
    pub fan_email: String,
    pub fan_phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub time_slot_id: Uuid,
    pub fan_name: String,
    pub fan_email: String,
    pub fan_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub time_slot_id: Uuid,
    pub fan_id: Uuid,
    pub fan_name: String,
    pub fan_email: String,
    pub fan_phone: String,
    pub created_at: DateTime<Utc>,
    pub event: EventSummary,
    pub time_slot: TimeSlotSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    pub message: String,
}
