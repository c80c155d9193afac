#![forbid(unsafe_code)]

//! Deadline timer queue with cancellable handles.
//!
//! [`TimerQueue`] replaces fire-and-forget `setTimeout` style callbacks with
//! explicit, inspectable timers. Each scheduled timer yields a
//! [`TimerHandle`] that its owner may keep and later pass to
//! [`TimerQueue::cancel`].
//!
//! # Invariants
//!
//! 1. Timers fire in deadline order; equal deadlines fire in scheduling order.
//! 2. A handle fires or is cancelled at most once.
//! 3. Handles are never reused within one queue, including across `clear()`.
//!
//! # Failure Modes
//!
//! - Cancelling an unknown or already-fired handle returns `None`.
//! - `pop_due` with a timestamp earlier than every deadline returns `None`.

use core::time::Duration;
use std::collections::{BTreeMap, HashMap};

/// Handle to a scheduled timer.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw handle value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Queue counters, useful for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    pub scheduled: u64,
    pub fired: u64,
    pub cancelled: u64,
}

/// Ordered queue of deadline timers carrying a payload `T`.
#[derive(Debug)]
pub struct TimerQueue<T> {
    pending: BTreeMap<(Duration, u64), T>,
    deadlines: HashMap<u64, Duration>,
    next_seq: u64,
    stats: TimerStats,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_seq: 1,
            stats: TimerStats::default(),
        }
    }

    /// Schedule `payload` to fire once `now >= deadline`.
    pub fn schedule(&mut self, deadline: Duration, payload: T) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((deadline, seq), payload);
        self.deadlines.insert(seq, deadline);
        self.stats.scheduled += 1;
        TimerHandle(seq)
    }

    /// Cancel a pending timer, returning its payload.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        let deadline = self.deadlines.remove(&handle.0)?;
        let payload = self.pending.remove(&(deadline, handle.0));
        if payload.is_some() {
            self.stats.cancelled += 1;
        }
        payload
    }

    /// Pop the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerHandle, T)> {
        let (&(deadline, seq), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let payload = self.pending.remove(&(deadline, seq))?;
        self.deadlines.remove(&seq);
        self.stats.fired += 1;
        Some((TimerHandle(seq), payload))
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Deadline of a specific pending timer.
    #[must_use]
    pub fn deadline_of(&self, handle: TimerHandle) -> Option<Duration> {
        self.deadlines.get(&handle.0).copied()
    }

    /// Whether `handle` is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub const fn stats(&self) -> TimerStats {
        self.stats
    }

    /// Drop every pending timer without firing it.
    ///
    /// The handle sequence keeps counting so stale handles stay unknown.
    pub fn clear(&mut self) {
        let dropped = self.pending.len() as u64;
        self.pending.clear();
        self.deadlines.clear();
        self.stats.cancelled += dropped;
    }
}
