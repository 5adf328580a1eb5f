pub mod booking;
pub mod event;
pub mod session;
pub mod time_slot;
pub mod user;
