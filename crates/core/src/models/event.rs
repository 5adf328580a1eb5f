use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_slot::{CreateTimeSlotRequest, TimeSlotResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    /// Event day in `YYYY-MM-DD`.
    pub event_date: String,
    pub time_slots: Vec<CreateTimeSlotRequest>,
}

/// Partial update. When `time_slots` is present the event's slots are
/// replaced wholesale; bookings on removed slots cascade away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub time_slots: Option<Vec<CreateTimeSlotRequest>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishEventRequest {
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishEventResponse {
    pub id: Uuid,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub unique_url: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<Vec<TimeSlotResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookings_count: Option<i64>,
}

/// Event view served from the public URL; admin-only fields are withheld.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicEventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub unique_url: String,
}

/// Summary embedded in booking responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub event_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            ((total as u64).div_ceil(per_page as u64)) as u32
        };
        Self { page, per_page, total, pages }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
    pub pagination: Pagination,
}

/// Query parameters shared by the paginated list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Resolves defaults (page 1, 10 per page) and caps per_page at 100.
    pub fn resolve(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(10).clamp(1, 100);
        (page, per_page)
    }

    /// The resolved query window as `(limit, offset)`. Computed in `i64`
    /// so a `page` near `u32::MAX` stays in range instead of overflowing.
    pub fn limit_offset(&self) -> (i64, i64) {
        let (page, per_page) = self.resolve();
        let limit = i64::from(per_page);
        let offset = (i64::from(page) - 1) * limit;
        (limit, offset)
    }
}
