//! Fixed-window rate limiting
//!
//! Caps outbound calls per time window. `acquire` suspends the caller
//! until capacity frees rather than failing, so a long wait is the only
//! effect of exceeding the limit.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Shared rate limiter for all outbound calls.
///
/// One instance is shared (via `Arc`) across both endpoints; the window
/// state is the single mutable resource of the run.
pub struct RateLimiter {
    max_calls: u32,
    period: Duration,
    window: Mutex<Window>,
}

struct Window {
    started: Instant,
    calls: u32,
}

impl RateLimiter {
    /// Create a limiter allowing `max_calls` per `period`.
    pub fn new(max_calls: u32, period: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            period,
            window: Mutex::new(Window {
                started: Instant::now(),
                calls: 0,
            }),
        }
    }

    /// Create from the config's calls/period-seconds pair.
    pub fn from_settings(calls: u32, period_secs: f64) -> Self {
        Self::new(calls, Duration::from_secs_f64(period_secs.max(0.0)))
    }

    /// Reserve one call slot, sleeping until the window has capacity.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut window = self.window.lock().await;
                let now = Instant::now();
                if now.duration_since(window.started) >= self.period {
                    window.started = now;
                    window.calls = 0;
                }
                if window.calls < self.max_calls {
                    window.calls += 1;
                    return;
                }
                self.period
                    .saturating_sub(now.duration_since(window.started))
            };
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_calls_within_limit_are_immediate() {
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_excess_call_waits_out_the_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        // The third acquire must wait for the first window to expire.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_limit_is_enforced_across_tasks() {
        let limiter = Arc::new(RateLimiter::new(2, Duration::from_millis(100)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move { limiter.acquire().await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // 4 calls at 2 per 100ms needs at least one extra window.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_zero_calls_clamped_to_one() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.max_calls, 1);
    }
}
