//! Deadline-based timers owned by the timeline
//!
//! Nothing here spawns tasks. The event loop calls `take_due` on every tick,
//! so clearing the set is all it takes to make sure nothing fires against an
//! unmounted timeline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Clears the "recently scrolled" flag
    ScrollActivity,
    /// One-shot group call peek after mount
    CallPeek,
    /// Deferred check of where focus went after a blur
    BlurCheck,
}

#[derive(Debug, Default)]
pub struct TimerSet {
    deadlines: HashMap<TimerKind, Instant>,
}

impl TimerSet {
    /// Arm a timer, superseding any pending deadline of the same kind
    pub fn arm(&mut self, kind: TimerKind, now: Instant, delay: Duration) {
        self.deadlines.insert(kind, now + delay);
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every expired timer, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<(TimerKind, Instant)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(kind, deadline)| (*kind, *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);

        for (kind, _) in &due {
            self.deadlines.remove(kind);
        }
        due.into_iter().map(|(kind, _)| kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_supersedes() {
        let start = Instant::now();
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::ScrollActivity, start, Duration::from_secs(3));
        timers.arm(
            TimerKind::ScrollActivity,
            start + Duration::from_secs(2),
            Duration::from_secs(3),
        );

        assert!(timers.take_due(start + Duration::from_secs(4)).is_empty());
        assert_eq!(
            timers.take_due(start + Duration::from_secs(5)),
            vec![TimerKind::ScrollActivity]
        );
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn test_due_in_deadline_order() {
        let start = Instant::now();
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::CallPeek, start, Duration::from_millis(500));
        timers.arm(TimerKind::BlurCheck, start, Duration::ZERO);

        assert_eq!(timers.next_deadline(), Some(start));
        assert_eq!(
            timers.take_due(start + Duration::from_secs(1)),
            vec![TimerKind::BlurCheck, TimerKind::CallPeek]
        );
    }

    #[test]
    fn test_clear_cancels_everything() {
        let start = Instant::now();
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::CallPeek, start, Duration::ZERO);
        timers.arm(TimerKind::BlurCheck, start, Duration::ZERO);
        timers.clear();
        assert!(timers.take_due(start + Duration::from_secs(1)).is_empty());
        assert_eq!(timers.next_deadline(), None);
    }
}
