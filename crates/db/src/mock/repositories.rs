use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::models::{DbBookingDetail, DbEvent, DbSession, DbTimeSlot, DbUser};
use crate::repositories::booking::{CancelledSlot, ReservedSlot};
use bookline_core::errors::BookingResult;

// Mock repositories for testing
mock! {
    pub UserRepo {
        pub async fn create_user(
            &self,
            email: &'static str,
            password_hash: &'static str,
            name: &'static str,
            role: &'static str,
        ) -> BookingResult<DbUser>;

        pub async fn get_user_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn get_user_by_email(
            &self,
            email: &'static str,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn update_profile(
            &self,
            id: Uuid,
            name: Option<&'static str>,
            email: Option<&'static str>,
        ) -> BookingResult<DbUser>;
    }
}

mock! {
    pub SessionRepo {
        pub async fn create_session(
            &self,
            user_id: Uuid,
            token: &'static str,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<DbSession>;

        pub async fn get_session_by_token(
            &self,
            token: &'static str,
        ) -> eyre::Result<Option<DbSession>>;

        pub async fn delete_session(
            &self,
            token: &'static str,
        ) -> eyre::Result<()>;
    }
}

mock! {
    pub EventRepo {
        pub async fn create_event(
            &self,
            admin_id: Uuid,
            title: &'static str,
            description: Option<&'static str>,
            event_date: NaiveDate,
            slots: Vec<(NaiveTime, NaiveTime)>,
        ) -> BookingResult<(DbEvent, Vec<DbTimeSlot>)>;

        pub async fn get_event_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbEvent>>;

        pub async fn get_event_for_admin(
            &self,
            id: Uuid,
            admin_id: Uuid,
        ) -> eyre::Result<Option<DbEvent>>;

        pub async fn set_published(
            &self,
            id: Uuid,
            is_published: bool,
        ) -> eyre::Result<DbEvent>;

        pub async fn get_published_event_by_url(
            &self,
            unique_url: &'static str,
        ) -> eyre::Result<Option<DbEvent>>;
    }
}

mock! {
    pub TimeSlotRepo {
        pub async fn get_time_slot_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbTimeSlot>>;

        pub async fn get_time_slots_by_event_id(
            &self,
            event_id: Uuid,
        ) -> eyre::Result<Vec<DbTimeSlot>>;

        pub async fn get_open_time_slots_by_event_id(
            &self,
            event_id: Uuid,
        ) -> eyre::Result<Vec<DbTimeSlot>>;
    }
}

mock! {
    pub BookingRepo {
        pub async fn reserve_slot(
            &self,
            time_slot_id: Uuid,
            fan_id: Uuid,
            fan_name: &'static str,
            fan_email: &'static str,
            fan_phone: &'static str,
        ) -> BookingResult<ReservedSlot>;

        pub async fn cancel_booking(
            &self,
            booking_id: Uuid,
            fan_id: Uuid,
        ) -> BookingResult<CancelledSlot>;

        pub async fn get_booking_detail(
            &self,
            booking_id: Uuid,
        ) -> eyre::Result<Option<DbBookingDetail>>;

        pub async fn list_bookings_by_fan(
            &self,
            fan_id: Uuid,
            limit: i64,
            offset: i64,
        ) -> eyre::Result<(Vec<DbBookingDetail>, i64)>;
    }
}
