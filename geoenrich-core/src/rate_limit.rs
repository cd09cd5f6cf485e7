use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Spaces out requests so that consecutive acquisitions start at least
/// `interval` apart. Safe to share between worker threads.
///
/// Each caller reserves the next free slot under the lock and sleeps outside
/// it, so waiting threads queue up in slot order.
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until this caller may send its request
    pub fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let wait = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot - now
        };

        if !wait.is_zero() {
            log::debug!("Rate limiting geocoding request for {:?}", wait);
            std::thread::sleep(wait);
        }
    }
}
