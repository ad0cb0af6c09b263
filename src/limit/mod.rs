//! Sliding-window send limiter.
//! The window trails continuously behind `now` rather than resetting on
//! aligned buckets. One instance per session; no shared state.

use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_sends: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_sends: 10,
            window: Duration::from_millis(60_000),
        }
    }
}

pub struct RateLimiter {
    config: RateLimitConfig,
    accepted: Vec<Instant>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            accepted: Vec::new(),
        }
    }

    /// Prune instants that have left the trailing window, then accept the
    /// send if the remaining count is under the cap. Accepting records `now`;
    /// rejecting mutates nothing beyond the prune.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let window = self.config.window;
        self.accepted.retain(|&t| now.duration_since(t) < window);

        if self.accepted.len() < self.config.max_sends {
            self.accepted.push(now);
            true
        } else {
            debug!(in_window = self.accepted.len(), "send rejected by rate limiter");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_sends: usize, window_ms: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_sends,
            window: Duration::from_millis(window_ms),
        })
    }

    #[test]
    fn accepts_up_to_the_cap_within_one_window() {
        let mut limiter = limiter(10, 60_000);
        let start = Instant::now();

        for i in 0..10 {
            let at = start + Duration::from_secs(i);
            assert!(limiter.try_acquire(at), "send {} should be accepted", i);
        }
        assert!(!limiter.try_acquire(start + Duration::from_secs(10)));
    }

    #[test]
    fn rejection_does_not_consume_a_slot() {
        let mut limiter = limiter(2, 60_000);
        let start = Instant::now();

        assert!(limiter.try_acquire(start));
        assert!(limiter.try_acquire(start));
        assert!(!limiter.try_acquire(start + Duration::from_secs(1)));
        assert!(!limiter.try_acquire(start + Duration::from_secs(2)));

        // Both accepted instants age out together; two slots reopen at once.
        let later = start + Duration::from_millis(60_000);
        assert!(limiter.try_acquire(later));
        assert!(limiter.try_acquire(later));
        assert!(!limiter.try_acquire(later));
    }

    #[test]
    fn window_slides_rather_than_resetting() {
        let mut limiter = limiter(2, 10_000);
        let start = Instant::now();

        assert!(limiter.try_acquire(start));
        assert!(limiter.try_acquire(start + Duration::from_secs(6)));
        assert!(!limiter.try_acquire(start + Duration::from_secs(9)));

        // The first instant has aged out; the second is still in the window.
        assert!(limiter.try_acquire(start + Duration::from_secs(11)));
        assert!(!limiter.try_acquire(start + Duration::from_secs(12)));
    }
}
