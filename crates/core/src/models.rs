pub mod booking;
pub mod event;
pub mod time_slot;
pub mod user;
