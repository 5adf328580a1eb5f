//! Input validation shared by the API layer.
//!
//! All checks return `BookingError::Validation` so handlers can bubble
//! failures straight to a 400 response with `?`.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::errors::{BookingError, BookingResult};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

pub fn validate_email(email: &str) -> BookingResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(BookingError::Validation("Invalid email format".to_string()))
    }
}

/// Phone numbers are stored verbatim; only a loose length check is applied.
pub fn validate_phone(phone: &str) -> BookingResult<()> {
    if (10..=15).contains(&phone.len()) {
        Ok(())
    } else {
        Err(BookingError::Validation(
            "Invalid phone number format".to_string(),
        ))
    }
}

pub fn validate_name(name: &str) -> BookingResult<()> {
    if (2..=100).contains(&name.chars().count()) {
        Ok(())
    } else {
        Err(BookingError::Validation(
            "Name must be between 2 and 100 characters".to_string(),
        ))
    }
}

/// Password policy: at least 8 characters with one uppercase letter, one
/// lowercase letter, one digit and one non-alphanumeric character.
pub fn validate_password(password: &str) -> BookingResult<()> {
    let long_enough = password.len() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(BookingError::Validation(
            "Password does not meet security requirements".to_string(),
        ))
    }
}

pub fn parse_event_date(date: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| BookingError::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))
}

pub fn parse_slot_time(time: &str) -> BookingResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| BookingError::Validation("Invalid time format. Use HH:MM".to_string()))
}

/// Parses one slot request, enforcing `start_time < end_time`.
pub fn parse_slot_times(start: &str, end: &str) -> BookingResult<(NaiveTime, NaiveTime)> {
    let start_time = parse_slot_time(start)?;
    let end_time = parse_slot_time(end)?;

    if start_time >= end_time {
        return Err(BookingError::Validation(
            "Start time must be before end time".to_string(),
        ));
    }

    Ok((start_time, end_time))
}
