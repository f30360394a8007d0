//! Owned set of one-shot timers on a millisecond clock
//!
//! The clock itself lives with the owner; timers only record the absolute
//! time they fall due. Due timers come out earliest first, ties in the
//! order they were scheduled.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct Timer<K> {
    pub id: TimerId,
    pub due_ms: f64,
    pub kind: K,
}

#[derive(Debug)]
pub struct TimerSet<K> {
    timers: Vec<Timer<K>>,
    next_id: u64,
}

impl<K> Default for TimerSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerSet<K> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn schedule(&mut self, due_ms: f64, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, due_ms, kind });
        id
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    fn earliest(&self) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(Ordering::Equal)
                    .then(a.id.0.cmp(&b.id.0))
            })
            .map(|(i, _)| i)
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<Timer<K>> {
        let i = self.earliest()?;
        if self.timers[i].due_ms <= now_ms {
            Some(self.timers.swap_remove(i))
        } else {
            None
        }
    }

    /// When the next timer falls due
    pub fn next_due(&self) -> Option<f64> {
        self.earliest().map(|i| self.timers[i].due_ms)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
