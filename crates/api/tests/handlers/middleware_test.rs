use argon2::PasswordVerifier;
use bookline_api::middleware::auth;
use bookline_core::errors::BookingError;

#[tokio::test]
async fn test_error_handling_not_found() {
    let error = BookingError::NotFound("Resource not found".to_string());
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_handling_validation() {
    let error = BookingError::Validation("Invalid input".to_string());
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_handling_conflict() {
    // A busy slot maps to 409, never to a server error.
    let error = BookingError::Conflict("Time slot already booked".to_string());
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_handling_authentication() {
    let error = BookingError::Authentication("Invalid password".to_string());
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_error_handling_authorization() {
    let error = BookingError::Authorization("Not authorized".to_string());
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_error_handling_rate_limited() {
    let error = BookingError::RateLimited("Too many requests".to_string());
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_error_handling_database() {
    let error = BookingError::Database(eyre::eyre!("Database error"));
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(
        response.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = BookingError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));
    let response = bookline_api::middleware::error_handling::map_error(error);
    assert_eq!(
        response.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_hash_password() {
    let password = "test_password";
    let hashed = auth::hash_password(password).unwrap();

    // The hash must not leak the password and must be a PHC string.
    assert_ne!(hashed, password);
    assert!(hashed.starts_with("$argon2"));
}

#[tokio::test]
async fn test_verify_password_round_trip() {
    let password = "test_password";
    let hashed = auth::hash_password(password).unwrap();

    assert!(auth::verify_password(&hashed, password).unwrap());
    assert!(!auth::verify_password(&hashed, "wrong_password").unwrap());

    // Cross-check against argon2 directly.
    let argon2 = argon2::Argon2::default();
    let parsed_hash = argon2::PasswordHash::new(&hashed).unwrap();
    assert!(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok());
}
