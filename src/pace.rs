//! Inter-frame pacing.
//!
//! Holds each iteration to an approximate target rate by sleeping away the
//! remainder of `1000 / rate` milliseconds. Best effort only: when an
//! iteration already took longer than the interval, no sleep happens and no
//! catch-up is attempted.

use std::time::{Duration, Instant};

use crate::error::{FeedError, Result};

pub struct Pacer {
    interval_ms: u64,
}

impl Pacer {
    /// `rate` is the target detections per second, at least 1. The interval
    /// uses integer division, so e.g. rate 3 paces at 333 ms.
    pub fn new(rate: u32) -> Result<Self> {
        if rate == 0 {
            return Err(FeedError::InvalidRate(rate));
        }
        Ok(Self {
            interval_ms: 1000 / u64::from(rate),
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Remaining sleep for an iteration that took `elapsed`. Never negative;
    /// zero when the iteration ran at or over the interval.
    pub fn delay_after(&self, elapsed: Duration) -> Duration {
        let elapsed_ms = elapsed.as_millis().min(u128::from(u64::MAX)) as u64;
        Duration::from_millis(self.interval_ms.saturating_sub(elapsed_ms))
    }

    /// Sleep away the remainder of the interval for an iteration that began
    /// at `started`.
    pub fn pace(&self, started: Instant) {
        let elapsed = started.elapsed();
        let delay = self.delay_after(elapsed);
        log::debug!(
            "iteration took {} ms, delaying {} ms",
            elapsed.as_millis(),
            delay.as_millis()
        );
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_uses_integer_division() {
        assert_eq!(Pacer::new(10).unwrap().interval(), Duration::from_millis(100));
        assert_eq!(Pacer::new(3).unwrap().interval(), Duration::from_millis(333));
        assert_eq!(Pacer::new(1).unwrap().interval(), Duration::from_millis(1000));
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(matches!(Pacer::new(0), Err(FeedError::InvalidRate(0))));
    }

    #[test]
    fn delay_covers_the_unused_part_of_the_interval() {
        let pacer = Pacer::new(10).unwrap();
        assert_eq!(
            pacer.delay_after(Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(pacer.delay_after(Duration::ZERO), Duration::from_millis(100));
    }

    #[test]
    fn no_delay_when_behind_schedule() {
        let pacer = Pacer::new(10).unwrap();
        assert_eq!(pacer.delay_after(Duration::from_millis(100)), Duration::ZERO);
        assert_eq!(pacer.delay_after(Duration::from_secs(5)), Duration::ZERO);
    }
}
