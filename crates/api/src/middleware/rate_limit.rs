//! # Rate Limiting
//!
//! Per-client request throttling with a fixed time window. The limiter is
//! an injected capability on [`crate::ApiState`], so the in-process
//! implementation can be swapped for a shared store without touching the
//! handlers that call it.
//!
//! The in-memory implementation keeps counters per key in this process
//! only. Its guarantee is best-effort per-process throttling, not a global
//! limit; callers must not assume precise enforcement across workers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use bookline_core::errors::BookingError;

/// Request budget for one operation: `max_requests` per `window`.
#[derive(Debug, Clone, Copy)]
pub struct Quota {
    pub max_requests: u32,
    pub window: Duration,
}

impl Quota {
    pub const fn per_hour(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(3600),
        }
    }

    pub const fn per_minutes(max_requests: u32, minutes: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(minutes * 60),
        }
    }
}

/// Counter store keyed by client, with a fixed window per key.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records one request against `key` and reports whether it fits the
    /// quota. Returns false when the budget for the current window is spent.
    async fn check_and_record(&self, key: &str, quota: Quota) -> bool;
}

struct FixedWindow {
    count: u32,
    started_at: Instant,
}

/// Process-local fixed-window limiter.
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, FixedWindow>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check_and_record(&self, key: &str, quota: Quota) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let window = windows.entry(key.to_string()).or_insert(FixedWindow {
            count: 0,
            started_at: now,
        });

        if now.duration_since(window.started_at) > quota.window {
            window.count = 0;
            window.started_at = now;
        }

        window.count += 1;
        window.count <= quota.max_requests
    }
}

/// Applies the quota for one operation, translating an exhausted budget
/// into the 429 branch of the error taxonomy.
pub async fn enforce(
    limiter: &dyn RateLimiter,
    key: String,
    quota: Quota,
) -> Result<(), BookingError> {
    if limiter.check_and_record(&key, quota).await {
        Ok(())
    } else {
        tracing::warn!("Rate limit exceeded for {}", key);
        Err(BookingError::RateLimited(
            "Too many requests, try again later".to_string(),
        ))
    }
}
