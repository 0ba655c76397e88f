//! Minimum-interval rate limiter for market data providers.
//!
//! Each live provider owns one limiter. A call is dispatched only once
//! `min_interval` has passed since the previous granted call; the lock is
//! held across the wait so concurrent callers queue up behind each other.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use tokio::sync::Mutex;

use crate::clock::Clock;

pub struct RateLimiter {
    provider: &'static str,
    min_interval: Duration,
    last_call: Mutex<Option<DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(provider: &'static str, min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            min_interval,
            last_call: Mutex::new(None),
            clock,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for a slot and claim it. Returns the dispatch time recorded.
    pub async fn acquire(&self) -> DateTime<Utc> {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let wait = self.remaining(previous);
            if !wait.is_zero() {
                debug!(
                    "Rate limiter: waiting {:?} for provider '{}'",
                    wait, self.provider
                );
                self.clock.sleep(wait).await;
            }
        }

        let now = self.clock.now();
        *last_call = Some(now);
        debug!("Rate limiter: granted slot for '{}'", self.provider);
        now
    }

    /// Time left before the next call may go out, capped at `min_interval`.
    fn remaining(&self, previous: DateTime<Utc>) -> Duration {
        let elapsed = self.clock.now() - previous;
        match elapsed.to_std() {
            Ok(elapsed) => self.min_interval.saturating_sub(elapsed),
            // Clock moved backwards.
            Err(_) => self.min_interval,
        }
    }

    pub async fn last_call(&self) -> Option<DateTime<Utc>> {
        *self.last_call.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_first_call_is_immediate() {
        let clock = clock();
        let limiter = RateLimiter::new("TEST", Duration::from_secs(12), clock.clone());

        let start = clock.now();
        assert_eq!(limiter.acquire().await, start);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_calls_are_spaced() {
        let clock = clock();
        let limiter = RateLimiter::new("TEST", Duration::from_secs(12), clock.clone());

        let first = limiter.acquire().await;
        let second = limiter.acquire().await;

        assert!(second - first >= chrono::Duration::seconds(12));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(12)]);
    }

    #[tokio::test]
    async fn test_partial_wait_after_elapsed_time() {
        let clock = clock();
        let limiter = RateLimiter::new("TEST", Duration::from_secs(12), clock.clone());

        let first = limiter.acquire().await;
        clock.advance(chrono::Duration::seconds(5));
        let second = limiter.acquire().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(7)]);
        assert_eq!(second - first, chrono::Duration::seconds(12));
    }

    #[tokio::test]
    async fn test_no_burst_after_idle_period() {
        let clock = clock();
        let limiter = RateLimiter::new("TEST", Duration::from_secs(1), clock.clone());

        limiter.acquire().await;
        clock.advance(chrono::Duration::minutes(10));
        let a = limiter.acquire().await;
        let b = limiter.acquire().await;

        assert!(b - a >= chrono::Duration::seconds(1));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_clock_going_backwards_waits_full_interval() {
        let clock = clock();
        let limiter = RateLimiter::new("TEST", Duration::from_secs(3), clock.clone());

        limiter.acquire().await;
        clock.advance(chrono::Duration::seconds(-30));
        limiter.acquire().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(3)]);
    }
}
