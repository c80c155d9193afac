#![forbid(unsafe_code)]

//! Enter/exit transition scheduling for overlay records.
//!
//! # Lifecycle
//!
//! ```text
//! open()          next frame          close()              settle delay
//!   │  attach        │ active style     │ active style off     │ detach
//!   ▼                ▼                  ▼                      ▼
//! Opening ───────► Active ──────────► Closing ─────────────► Removed
//!   └────────────── close() before the first frame ──────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `attach` happens in `open`, strictly before the frame that applies the
//!    active style, so the enter transition is observable.
//! 2. `detach` happens exactly once, in `settle`; the node is dropped there.
//! 3. Removal uses a deadline timer, not an animation-end event, so an
//!    interrupted transition still settles.
//! 4. Timers of different records are independent and may overlap.
//!
//! The scheduler only holds record keys and timer handles; records and their
//! nodes stay owned by the stack.

use core::time::Duration;

use strata_core::{RecordKey, TimerQueue, TimerStats};
use tracing::trace;

use crate::record::{ContentState, Lifecycle, OverlayRecord};

const TARGET: &str = "strata.transition";

/// Timed lifecycle driver shared by all records of one stack.
#[derive(Debug)]
pub struct TransitionScheduler {
    settle_delay: Duration,
    frame_queue: Vec<RecordKey>,
    timers: TimerQueue<RecordKey>,
}

impl TransitionScheduler {
    #[must_use]
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            frame_queue: Vec::new(),
            timers: TimerQueue::new(),
        }
    }

    #[inline]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Attach a fresh record and queue it for activation on the next frame.
    pub fn open(&mut self, record: &mut OverlayRecord) {
        record.lifecycle = Lifecycle::Opening;
        if let Some(node) = record.node.as_mut() {
            node.attach();
        }
        self.frame_queue.push(record.key);
        trace!(target: TARGET, key = %record.key, "attached, awaiting frame");
    }

    /// Records queued for activation, in open order. Clears the queue.
    pub fn take_frame_batch(&mut self) -> Vec<RecordKey> {
        std::mem::take(&mut self.frame_queue)
    }

    /// Apply the active style to an `Opening` record. Other states are left
    /// untouched (a record closed before its frame must not flash active).
    pub fn activate(&mut self, record: &mut OverlayRecord) -> bool {
        if record.lifecycle != Lifecycle::Opening {
            return false;
        }
        record.lifecycle = Lifecycle::Active;
        if let Some(node) = record.node.as_mut() {
            node.set_active_style(true);
        }
        trace!(target: TARGET, key = %record.key, "active");
        true
    }

    /// Activate out of band, without waiting for the frame.
    pub fn promote(&mut self, record: &mut OverlayRecord) -> bool {
        self.frame_queue.retain(|key| *key != record.key);
        self.activate(record)
    }

    /// Start the exit transition and schedule removal at `now + settle_delay`.
    ///
    /// Returns `false` if the record is not live (already closing or removed).
    pub fn close(&mut self, record: &mut OverlayRecord, now: Duration) -> bool {
        if !record.lifecycle.is_live() {
            return false;
        }
        self.frame_queue.retain(|key| *key != record.key);
        record.lifecycle = Lifecycle::Closing;
        if let Some(node) = record.node.as_mut() {
            node.set_active_style(false);
        }
        let deadline = now.saturating_add(self.settle_delay);
        record.settle_timer = Some(self.timers.schedule(deadline, record.key));
        trace!(target: TARGET, key = %record.key, deadline_ms = deadline.as_millis() as u64, "closing");
        true
    }

    /// Next record whose removal timer has expired at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<RecordKey> {
        self.timers.pop_due(now).map(|(_, key)| key)
    }

    /// Detach the node, free content, and mark the record `Removed`.
    pub fn settle(&mut self, record: &mut OverlayRecord) {
        if let Some(mut node) = record.node.take() {
            node.detach();
        }
        record.content = ContentState::Empty;
        record.lifecycle = Lifecycle::Removed;
        record.settle_timer = None;
        trace!(target: TARGET, key = %record.key, "removed");
    }

    /// Cancel a pending removal timer. Returns whether one was pending.
    ///
    /// Current policy never resurrects a closing record; teardown uses this
    /// to drop timers of records it detaches immediately.
    pub fn cancel_settle(&mut self, record: &mut OverlayRecord) -> bool {
        match record.settle_timer.take() {
            Some(handle) => self.timers.cancel(handle).is_some(),
            None => false,
        }
    }

    /// Earliest pending removal deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// No frame flip and no removal pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.frame_queue.is_empty() && self.timers.is_empty()
    }

    #[must_use]
    pub fn timer_stats(&self) -> TimerStats {
        self.timers.stats()
    }

    /// Forget all queued work.
    pub fn clear(&mut self) {
        self.frame_queue.clear();
        self.timers.clear();
    }
}
