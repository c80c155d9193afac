#![forbid(unsafe_code)]

//! The overlay stack: ordered records, push/close/reconcile.
//!
//! # Design
//!
//! Records are kept in a `Vec` ordered by [`RecordKey`], which doubles as the
//! stack position. Closing records (ghosts) stay in the vector until their
//! removal timer fires, so a fetch completion or timer can always find the
//! record it belongs to. Two counters track the stack's shape:
//!
//! - `live`: records in `Opening`/`Active`.
//! - `closing_in_flight`: incremented when a close is issued, decremented
//!   when that record settles.
//!
//! The non-empty→empty edge fires when a settle brings `closing_in_flight` to
//! zero while `live` is zero. The collection is never re-scanned to decide
//! emptiness.
//!
//! # Invariants
//!
//! 1. Positions are strictly increasing bottom to top and never reused, even
//!    across [`OverlayStack::reset`].
//! 2. No two live records share an id at the top: pushing the current top id
//!    is a no-op.
//! 3. Closing proceeds top-down; `close_all` starts every exit in one call.
//! 4. One scroll save per empty→non-empty edge, one restore per
//!    non-empty→empty edge.
//! 5. Lower layers are never recreated by reconciliation.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Fetch completes for a removed/closing record | Discarded, counted as stale |
//! | Fetch completes for an abandoned retry attempt | Discarded, counted as stale |
//! | Payload fails to render | Record shows the error view |
//! | Push of an id that is currently closing | New record; ghost settles on its own |

use core::time::Duration;

use strata_core::{ContentError, ContentId, FetchTicket, NavConfig, NodeBody, RecordKey};
use tracing::{debug, debug_span, info, trace};

use crate::content::{ContentProvider, ContentRenderer, FetchOutcome};
use crate::record::{ContentState, OverlayRecord};
use crate::scroll::ScrollCoordinator;
use crate::surface::{BackgroundView, NodeFactory};
use crate::transition::TransitionScheduler;

const TARGET: &str = "strata.stack";

/// Host capabilities the stack drives.
pub struct Collaborators {
    pub nodes: Box<dyn NodeFactory>,
    pub provider: Box<dyn ContentProvider>,
    pub renderer: Box<dyn ContentRenderer>,
    pub background: Box<dyn BackgroundView>,
}

/// Result of [`OverlayStack::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new record was created.
    Opened(RecordKey),
    /// The id is already on top; nothing changed.
    AlreadyTop(RecordKey),
}

impl PushOutcome {
    #[inline]
    pub fn key(self) -> RecordKey {
        match self {
            Self::Opened(key) | Self::AlreadyTop(key) => key,
        }
    }
}

/// Result of [`OverlayStack::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Target was `None`; every live record began closing.
    ClosedAll(usize),
    /// Target found in the stack; records above it began closing.
    Trimmed {
        target: RecordKey,
        closed: usize,
        promoted: bool,
    },
    /// Target not in the stack; pushed as a fresh record.
    Pushed(PushOutcome),
}

/// Result of [`OverlayStack::deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Content rendered into the record.
    Ready(RecordKey),
    /// The record now shows its error view.
    Failed(RecordKey),
    /// No live record expects this ticket.
    Stale,
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackStats {
    pub pushes: u64,
    pub idempotent_pushes: u64,
    pub closes: u64,
    pub settles: u64,
    pub stale_deliveries: u64,
    pub retries: u64,
}

/// Ordered collection of overlay records.
pub struct OverlayStack {
    records: Vec<OverlayRecord>,
    next_position: u64,
    live: usize,
    closing_in_flight: usize,
    now: Duration,
    transitions: TransitionScheduler,
    scroll: ScrollCoordinator,
    nodes: Box<dyn NodeFactory>,
    provider: Box<dyn ContentProvider>,
    renderer: Box<dyn ContentRenderer>,
    stats: StackStats,
}

impl std::fmt::Debug for OverlayStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStack")
            .field("records", &self.records)
            .field("live", &self.live)
            .field("closing_in_flight", &self.closing_in_flight)
            .field("now", &self.now)
            .field("scroll", &self.scroll)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl OverlayStack {
    pub fn new(config: &NavConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            nodes,
            provider,
            renderer,
            background,
        } = collaborators;
        Self {
            records: Vec::new(),
            next_position: 0,
            live: 0,
            closing_in_flight: 0,
            now: Duration::ZERO,
            transitions: TransitionScheduler::new(config.settle_delay()),
            scroll: ScrollCoordinator::new(background),
            nodes,
            provider,
            renderer,
            stats: StackStats::default(),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// All records still in the collection, bottom to top, ghosts included.
    #[inline]
    pub fn records(&self) -> &[OverlayRecord] {
        &self.records
    }

    /// Live records, bottom to top.
    pub fn live(&self) -> impl Iterator<Item = &OverlayRecord> + '_ {
        self.records.iter().filter(|r| r.is_live())
    }

    /// Topmost live record.
    pub fn top(&self) -> Option<&OverlayRecord> {
        self.records.iter().rev().find(|r| r.is_live())
    }

    pub fn get(&self, key: RecordKey) -> Option<&OverlayRecord> {
        self.index_of(key).map(|idx| &self.records[idx])
    }

    #[inline]
    pub fn live_len(&self) -> usize {
        self.live
    }

    /// Records in the collection including ghosts.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn closing_in_flight(&self) -> usize {
        self.closing_in_flight
    }

    /// No transition is in flight: no pending frame flip, no ghost.
    pub fn is_settled(&self) -> bool {
        self.transitions.is_idle() && self.closing_in_flight == 0
    }

    #[inline]
    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    #[inline]
    pub fn stats(&self) -> StackStats {
        self.stats
    }

    /// Last time observed through [`tick`](Self::tick).
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Earliest pending removal deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.transitions.next_deadline()
    }

    fn index_of(&self, key: RecordKey) -> Option<usize> {
        self.records.binary_search_by_key(&key, |r| r.key()).ok()
    }

    // ── Push ────────────────────────────────────────────────────────────

    /// Open `id` on top of the stack unless it is already the top.
    pub fn push(&mut self, id: ContentId) -> PushOutcome {
        if let Some(top) = self.top().filter(|r| *r.id() == id).map(OverlayRecord::key) {
            self.stats.idempotent_pushes += 1;
            trace!(target: TARGET, id = %id, key = %top, "already on top");
            return PushOutcome::AlreadyTop(top);
        }

        let key = RecordKey::from_raw(self.next_position);
        self.next_position += 1;

        if self.live == 0 {
            self.scroll.on_became_non_empty(key);
        }

        let node = self.nodes.create(key, &id);
        let mut record = OverlayRecord::new(id, key, node);
        self.transitions.open(&mut record);
        record.content = ContentState::Loading;
        record.present(&NodeBody::Loading);
        self.provider.request(record.ticket, &record.id);

        debug!(target: TARGET, id = %record.id, key = %key, live = self.live + 1, "push");
        self.records.push(record);
        self.live += 1;
        self.stats.pushes += 1;
        PushOutcome::Opened(key)
    }

    // ── Close ───────────────────────────────────────────────────────────

    fn close_at(&mut self, idx: usize) -> bool {
        let record = &mut self.records[idx];
        if !self.transitions.close(record, self.now) {
            return false;
        }
        self.live -= 1;
        self.closing_in_flight += 1;
        self.stats.closes += 1;
        debug!(
            target: TARGET,
            id = %record.id,
            key = %record.key,
            live = self.live,
            closing = self.closing_in_flight,
            "close"
        );
        true
    }

    /// Close the topmost live record.
    pub fn close_top(&mut self) -> Option<RecordKey> {
        let idx = self.records.iter().rposition(|r| r.is_live())?;
        self.close_at(idx);
        Some(self.records[idx].key())
    }

    /// Close, top-down, every live record above `position`.
    pub fn close_above(&mut self, position: u64) -> usize {
        let mut closed = 0;
        for idx in (0..self.records.len()).rev() {
            if self.records[idx].position() <= position {
                break;
            }
            if self.close_at(idx) {
                closed += 1;
            }
        }
        closed
    }

    /// Start closing every live record in this call.
    pub fn close_all(&mut self) -> usize {
        let mut closed = 0;
        for idx in (0..self.records.len()).rev() {
            if self.close_at(idx) {
                closed += 1;
            }
        }
        if closed > 0 {
            info!(target: TARGET, closed, "close all");
        }
        closed
    }

    /// Close `key` and every live record above it. Returns how many records
    /// began closing; zero if `key` is unknown or already closing.
    pub fn close(&mut self, key: RecordKey) -> usize {
        let Some(idx) = self.index_of(key) else {
            return 0;
        };
        if !self.records[idx].is_live() {
            return 0;
        }
        let above = self.close_above(key.raw());
        above + usize::from(self.close_at(idx))
    }

    // ── Reconcile ───────────────────────────────────────────────────────

    /// Bring the stack in line with a navigation target.
    ///
    /// - `None`: close everything.
    /// - Target live in the stack (searched top-down): close what is above it
    ///   and promote it if it is still `Opening`.
    /// - Target absent (or only present as a ghost): push it as a new record.
    pub fn reconcile(&mut self, target: Option<&ContentId>) -> ReconcileOutcome {
        let _span = debug_span!(
            target: TARGET,
            "reconcile",
            target = target.map_or("", ContentId::as_str),
            live = self.live
        )
        .entered();

        let Some(id) = target else {
            return ReconcileOutcome::ClosedAll(self.close_all());
        };

        let found = self
            .records
            .iter()
            .rposition(|r| r.is_live() && r.id() == id);
        match found {
            Some(idx) => {
                let key = self.records[idx].key();
                let closed = self.close_above(key.raw());
                let promoted = self.transitions.promote(&mut self.records[idx]);
                debug!(target: TARGET, key = %key, closed, promoted, "trimmed to target");
                ReconcileOutcome::Trimmed {
                    target: key,
                    closed,
                    promoted,
                }
            }
            None => {
                debug!(target: TARGET, id = %id, "target not in stack, pushing");
                ReconcileOutcome::Pushed(self.push(id.clone()))
            }
        }
    }

    // ── Content ─────────────────────────────────────────────────────────

    /// Apply a fetch completion.
    pub fn deliver(&mut self, ticket: FetchTicket, outcome: FetchOutcome) -> Delivery {
        let idx = match self.index_of(ticket.record) {
            Some(idx)
                if self.records[idx].is_live() && self.records[idx].ticket == ticket =>
            {
                idx
            }
            _ => {
                self.stats.stale_deliveries += 1;
                debug!(
                    target: TARGET,
                    key = %ticket.record,
                    attempt = ticket.attempt,
                    "stale fetch completion discarded"
                );
                return Delivery::Stale;
            }
        };

        let rendered = outcome.and_then(|payload| {
            self.renderer
                .render(&payload)
                .map(|fragment| (payload, fragment))
        });
        let record = &mut self.records[idx];
        match rendered {
            Ok((payload, fragment)) => {
                record.content = ContentState::Ready(payload);
                record.present(&NodeBody::Ready(fragment));
                trace!(target: TARGET, key = %record.key, "content ready");
                Delivery::Ready(record.key)
            }
            Err(error) => {
                let view = self.renderer.error_view(&error);
                debug!(target: TARGET, key = %record.key, kind = error.kind(), %error, "content failed");
                record.content = ContentState::Failed(error.clone());
                record.present(&NodeBody::Failed { error, view });
                Delivery::Failed(record.key)
            }
        }
    }

    /// Re-issue the fetch for a live record showing its error view.
    pub fn retry(&mut self, key: RecordKey) -> Option<FetchTicket> {
        let idx = self.index_of(key)?;
        let record = &mut self.records[idx];
        if !record.is_live() || !matches!(record.content, ContentState::Failed(_)) {
            return None;
        }
        record.ticket = record.ticket.next_attempt();
        record.content = ContentState::Loading;
        record.present(&NodeBody::Loading);
        self.provider.request(record.ticket, &record.id);
        self.stats.retries += 1;
        debug!(target: TARGET, key = %key, attempt = record.ticket.attempt, "retry");
        Some(record.ticket)
    }

    /// Record a failure that never reached the provider (e.g. the host could
    /// not even start the request).
    pub fn fail(&mut self, ticket: FetchTicket, error: ContentError) -> Delivery {
        self.deliver(ticket, Err(error))
    }

    // ── Time ────────────────────────────────────────────────────────────

    /// Animation frame: activate records opened since the last frame.
    pub fn on_animation_frame(&mut self) -> usize {
        let mut activated = 0;
        for key in self.transitions.take_frame_batch() {
            if let Some(idx) = self.index_of(key)
                && self.transitions.activate(&mut self.records[idx])
            {
                activated += 1;
            }
        }
        activated
    }

    /// Advance time and settle every record whose removal is due.
    pub fn tick(&mut self, now: Duration) -> usize {
        self.now = self.now.max(now);
        let mut settled = 0;
        while let Some(key) = self.transitions.pop_due(self.now) {
            let Some(idx) = self.index_of(key) else {
                continue;
            };
            let mut record = self.records.remove(idx);
            self.transitions.settle(&mut record);
            self.closing_in_flight = self.closing_in_flight.saturating_sub(1);
            self.stats.settles += 1;
            settled += 1;
            if self.closing_in_flight == 0 && self.live == 0 {
                self.scroll.on_became_empty();
            }
        }
        settled
    }

    /// Detach everything immediately and restore the background.
    ///
    /// Positions keep counting so late completions for old records stay
    /// stale.
    pub fn reset(&mut self) {
        for mut record in self.records.drain(..) {
            self.transitions.cancel_settle(&mut record);
            self.transitions.settle(&mut record);
        }
        self.transitions.clear();
        self.scroll.reset();
        self.live = 0;
        self.closing_in_flight = 0;
        self.stats = StackStats::default();
        info!(target: TARGET, "reset");
    }

    #[cfg(test)]
    pub(crate) fn lifecycle_of(&self, key: RecordKey) -> Option<crate::record::Lifecycle> {
        self.get(key).map(OverlayRecord::lifecycle)
    }
}
