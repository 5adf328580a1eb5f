use std::time::Duration;

use bookline_api::middleware::rate_limit::{self, InMemoryRateLimiter, Quota, RateLimiter};
use bookline_core::errors::BookingError;

#[tokio::test]
async fn test_requests_within_quota_pass() {
    let limiter = InMemoryRateLimiter::new();
    let quota = Quota::per_hour(3);

    for _ in 0..3 {
        assert!(limiter.check_and_record("client-a", quota).await);
    }
}

#[tokio::test]
async fn test_request_over_quota_is_rejected() {
    let limiter = InMemoryRateLimiter::new();
    let quota = Quota::per_hour(2);

    assert!(limiter.check_and_record("client-a", quota).await);
    assert!(limiter.check_and_record("client-a", quota).await);
    assert!(!limiter.check_and_record("client-a", quota).await);
}

#[tokio::test]
async fn test_keys_are_isolated() {
    let limiter = InMemoryRateLimiter::new();
    let quota = Quota::per_hour(1);

    assert!(limiter.check_and_record("client-a", quota).await);
    assert!(!limiter.check_and_record("client-a", quota).await);

    // A different client keeps its own budget.
    assert!(limiter.check_and_record("client-b", quota).await);
}

#[tokio::test]
async fn test_window_resets_after_expiry() {
    let limiter = InMemoryRateLimiter::new();
    let quota = Quota {
        max_requests: 1,
        window: Duration::from_millis(20),
    };

    assert!(limiter.check_and_record("client-a", quota).await);
    assert!(!limiter.check_and_record("client-a", quota).await);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(limiter.check_and_record("client-a", quota).await);
}

#[tokio::test]
async fn test_enforce_maps_exhaustion_to_rate_limited() {
    let limiter = InMemoryRateLimiter::new();
    let quota = Quota::per_hour(1);

    assert!(rate_limit::enforce(&limiter, "op:client".to_string(), quota)
        .await
        .is_ok());

    let result = rate_limit::enforce(&limiter, "op:client".to_string(), quota).await;
    match result {
        Err(BookingError::RateLimited(_)) => {}
        other => panic!("expected rate limited, got {other:?}"),
    }
}
