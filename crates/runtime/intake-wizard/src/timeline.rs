//! Simulated clock with cancellable scheduled continuations.
//!
//! The wizard never sleeps. Its host reports the current time and the timeline
//! releases every continuation whose deadline has passed, in deadline order.
//! While a continuation is being handled the clock reads that continuation's
//! deadline, so anything it schedules is timed from when it was due rather
//! than from when the host happened to tick.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle for a scheduled continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct Timeline<T> {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `payload` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now + delay, id), payload);
        id
    }

    /// Cancel a pending continuation, returning its payload if it had not fired.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.pending.keys().find(|(_, pending)| *pending == id).copied()?;
        self.pending.remove(&key)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.keys().any(|(_, pending)| *pending == id)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    /// Release the earliest continuation due at or before `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let (at, id) = *self.pending.keys().next()?;
        if at > until {
            return None;
        }
        let payload = self.pending.remove(&(at, id))?;
        self.now = self.now.max(at);
        Some((id, payload))
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(300), "exit");
        timeline.schedule(ms(100), "settle");
        timeline.schedule(ms(400), "advance");

        assert_eq!(timeline.pop_due(ms(350)).map(|(_, p)| p), Some("settle"));
        assert_eq!(timeline.now(), ms(100));
        assert_eq!(timeline.pop_due(ms(350)).map(|(_, p)| p), Some("exit"));
        assert_eq!(timeline.now(), ms(300));
        assert!(timeline.pop_due(ms(350)).is_none());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_schedule_is_relative_to_current_deadline() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(300), 1);

        // Host ticks late, at 500ms
        let (_, first) = timeline.pop_due(ms(500)).unwrap();
        assert_eq!(first, 1);
        timeline.schedule(ms(100), 2);
        assert_eq!(timeline.next_deadline(), Some(ms(400)));
        assert_eq!(timeline.pop_due(ms(500)).map(|(_, p)| p), Some(2));
    }

    #[test]
    fn test_cancel_removes_pending() {
        let mut timeline = Timeline::new();
        let id = timeline.schedule(ms(400), "advance");
        assert!(timeline.is_pending(id));
        assert_eq!(timeline.cancel(id), Some("advance"));
        assert!(!timeline.is_pending(id));
        assert_eq!(timeline.cancel(id), None);
        assert!(timeline.pop_due(ms(1000)).is_none());
    }

    #[test]
    fn test_equal_deadlines_fire_in_schedule_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(200), "a");
        timeline.schedule(ms(200), "b");
        assert_eq!(timeline.pop_due(ms(200)).map(|(_, p)| p), Some("a"));
        assert_eq!(timeline.pop_due(ms(200)).map(|(_, p)| p), Some("b"));
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut timeline: Timeline<()> = Timeline::new();
        timeline.set_now(ms(500));
        timeline.set_now(ms(200));
        assert_eq!(timeline.now(), ms(500));
    }
}
