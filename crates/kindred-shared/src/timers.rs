//! Virtual-clock timer queue.
//!
//! Screens in the app fake latency with delayed callbacks. Here every delay
//! is an entry in a [`TimerQueue`] owned by the core that scheduled it, so
//! timers are always cancelable and die with their owner. Time only moves
//! when the owner advances the clock: tests step it by hand, the async
//! driver steps it with real elapsed time.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Pending delayed events keyed by `(deadline, scheduling order)`.
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, u64), E>,
    deadlines: HashMap<u64, Duration>,
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Virtual time elapsed since the queue was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `event` once `delay` has elapsed from the current virtual time.
    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now + delay;
        self.pending.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);
        trace!(timer = id, deadline_ms = deadline.as_millis() as u64, "Timer scheduled");
        TimerId(id)
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// canceled before, which makes repeated cancellation harmless.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(deadline) => {
                self.pending.remove(&(deadline, id.0));
                trace!(timer = id.0, "Timer canceled");
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        self.deadlines.clear();
        count
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id.0)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Virtual deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// How long until the earliest pending timer fires.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now))
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Handlers may schedule new timers between pops; those
    /// are considered by the next call, so a single advance can fire a
    /// periodic timer many times.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        let key = *self.pending.keys().next()?;
        if key.0 > until {
            return None;
        }
        let event = self.pending.remove(&key)?;
        self.deadlines.remove(&key.1);
        if key.0 > self.now {
            self.now = key.0;
        }
        Some(event)
    }

    /// Move the clock forward without firing anything. Never moves it back.
    pub fn set_now(&mut self, t: Duration) {
        if t > self.now {
            self.now = t;
        }
    }

    /// Advance by `by` and return every event that came due, in order.
    /// Suitable when handlers do not schedule follow-up timers.
    pub fn advance(&mut self, by: Duration) -> Vec<E> {
        let target = self.now + by;
        let mut fired = Vec::new();
        while let Some(event) = self.pop_due(target) {
            fired.push(event);
        }
        self.set_now(target);
        fired
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(2000), "reply");
        q.schedule(ms(1000), "deliver");

        assert!(q.advance(ms(999)).is_empty());
        assert_eq!(q.advance(ms(1)), vec!["deliver"]);
        assert_eq!(q.advance(ms(5000)), vec!["reply"]);
        assert!(q.is_empty());
        assert_eq!(q.now(), ms(6000));
    }

    #[test]
    fn test_same_deadline_keeps_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(10), 1);
        q.schedule(ms(10), 2);
        q.schedule(ms(10), 3);
        assert_eq!(q.advance(ms(10)), vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(100), ());
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.advance(ms(1000)).is_empty());
    }

    #[test]
    fn test_cancel_after_fire_returns_false() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(5), ());
        assert_eq!(q.advance(ms(5)).len(), 1);
        assert!(!q.cancel(id));
    }

    #[test]
    fn test_pop_due_allows_rescheduling() {
        let mut q = TimerQueue::new();
        q.schedule(ms(1000), 1u32);
        let mut ticks = 0;
        while let Some(n) = q.pop_due(ms(5000)) {
            ticks += 1;
            if n < 10 {
                q.schedule(ms(1000), n + 1);
            }
        }
        assert_eq!(ticks, 5);
        assert_eq!(q.now(), ms(5000));
        assert_eq!(q.time_until_next(), Some(ms(1000)));
    }

    #[test]
    fn test_cancel_all() {
        let mut q = TimerQueue::new();
        q.schedule(ms(1), 'a');
        q.schedule(ms(2), 'b');
        assert_eq!(q.cancel_all(), 2);
        assert_eq!(q.next_deadline(), None);
    }
}
