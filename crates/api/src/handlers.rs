pub mod auth;
pub mod booking;
pub mod event;
pub mod public;
pub mod user;
