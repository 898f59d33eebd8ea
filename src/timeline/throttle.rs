//! Trailing-edge throttle for mark-read requests
//!
//! The first trigger in a quiet period opens a window; triggers inside the
//! window are absorbed. When the window closes the caller fires once, reading
//! whatever value is current at that moment.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TrailingThrottle {
    window: Duration,
    deadline: Option<Instant>,
}

impl TrailingThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Note activity. Never fires immediately.
    pub fn trigger(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.window);
        }
    }

    /// Returns true once per window, when `now` has reached its end
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_leading_edge() {
        let start = Instant::now();
        let mut throttle = TrailingThrottle::new(Duration::from_millis(500));
        throttle.trigger(start);
        assert!(!throttle.poll(start));
        assert!(!throttle.poll(start + Duration::from_millis(499)));
        assert!(throttle.poll(start + Duration::from_millis(500)));
        assert!(!throttle.poll(start + Duration::from_millis(501)));
    }

    #[test]
    fn test_burst_collapses_to_one_fire() {
        let start = Instant::now();
        let mut throttle = TrailingThrottle::new(Duration::from_millis(500));
        for ms in [0, 100, 200, 450] {
            throttle.trigger(start + Duration::from_millis(ms));
        }
        // The window is anchored at the first trigger, not extended
        assert_eq!(throttle.deadline(), Some(start + Duration::from_millis(500)));

        let fires = (0..=1000)
            .step_by(50)
            .filter(|ms| throttle.poll(start + Duration::from_millis(*ms)))
            .count();
        assert_eq!(fires, 1);
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut throttle = TrailingThrottle::new(Duration::from_millis(500));
        throttle.trigger(start);
        throttle.cancel();
        assert!(!throttle.poll(start + Duration::from_secs(1)));
    }
}
