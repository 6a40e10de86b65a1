use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Cancellable handle for a scheduled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// An event popped from the queue.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired<E> {
    pub handle: TimerHandle,
    pub due: Duration,
    pub event: E,
}

/// Single-threaded timer facility over a virtual monotonic clock.
///
/// Events fire in `(due, schedule order)` order, so events registered with increasing delays fire
/// in that order and ties keep their registration order. Cancelling removes the event outright;
/// cancelling a fired or unknown handle is a no-op.
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), E>,
    due_by_seq: HashMap<u64, Duration>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
            due_by_seq: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `event` to fire `delay` after the current virtual time.
    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now + delay;
        self.pending.insert((due, seq), event);
        self.due_by_seq.insert(seq, due);
        TimerHandle(seq)
    }

    /// Remove a pending event. Returns it when it had not fired yet.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<E> {
        let due = self.due_by_seq.remove(&handle.0)?;
        self.pending.remove(&(due, handle.0))
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.due_by_seq.contains_key(&handle.0)
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest event due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<E>> {
        let (&(due, seq), _) = self.pending.first_key_value()?;
        if due > until {
            return None;
        }
        let event = self.pending.remove(&(due, seq))?;
        self.due_by_seq.remove(&seq);
        self.now = self.now.max(due);
        Some(Fired {
            handle: TimerHandle(seq),
            due,
            event,
        })
    }

    /// Move the clock forward to `t` (never backwards) without firing anything.
    pub fn advance_clock(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/timer.rs"]
mod tests;
