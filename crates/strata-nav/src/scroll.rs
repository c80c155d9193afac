#![forbid(unsafe_code)]

//! Background scroll preservation.
//!
//! The background list keeps one scroll offset for the whole session. While
//! any overlay is open the list is hidden from layout, so its offset would be
//! lost; the coordinator records it on the empty→non-empty edge and jumps
//! back to it on the non-empty→empty edge.
//!
//! # Invariants
//!
//! - One save per empty→non-empty edge and one restore per non-empty→empty
//!   edge. Repeated notifications of the same edge are no-ops.
//! - Saves and restores never nest: `Saved` is only entered from `Unsaved`.
//! - Restoration is a jump, never a smooth scroll.

use strata_core::RecordKey;
use tracing::debug;

use crate::surface::BackgroundView;

const TARGET: &str = "strata.scroll";

/// Saved-offset lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScrollState {
    #[default]
    Unsaved,
    Saved { offset: f64 },
}

/// Save/restore counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollStats {
    pub saves: u64,
    pub restores: u64,
}

/// Sole owner of the background scroll offset.
pub struct ScrollCoordinator {
    background: Box<dyn BackgroundView>,
    state: ScrollState,
    stats: ScrollStats,
}

impl std::fmt::Debug for ScrollCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollCoordinator")
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ScrollCoordinator {
    #[must_use]
    pub fn new(background: Box<dyn BackgroundView>) -> Self {
        Self {
            background,
            state: ScrollState::Unsaved,
            stats: ScrollStats::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> ScrollState {
        self.state
    }

    #[inline]
    pub fn stats(&self) -> ScrollStats {
        self.stats
    }

    /// Record the offset and hide the background. Returns whether a save
    /// happened.
    pub fn on_became_non_empty(&mut self, first: RecordKey) -> bool {
        if let ScrollState::Saved { .. } = self.state {
            return false;
        }
        let offset = self.background.scroll_offset();
        self.background.set_hidden(true);
        self.state = ScrollState::Saved { offset };
        self.stats.saves += 1;
        debug!(target: TARGET, offset, first = %first, "background saved");
        true
    }

    /// Show the background and jump to the saved offset. Returns whether a
    /// restore happened.
    pub fn on_became_empty(&mut self) -> bool {
        let ScrollState::Saved { offset } = self.state else {
            return false;
        };
        self.background.set_hidden(false);
        self.background.jump_to(offset);
        self.state = ScrollState::Unsaved;
        self.stats.restores += 1;
        debug!(target: TARGET, offset, "background restored");
        true
    }

    /// Restore if saved, then zero the counters.
    pub fn reset(&mut self) {
        self.on_became_empty();
        self.stats = ScrollStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BackgroundState, FakeBackground};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn coordinator(offset: f64) -> (ScrollCoordinator, Rc<RefCell<BackgroundState>>) {
        let state = Rc::new(RefCell::new(BackgroundState {
            offset,
            ..BackgroundState::default()
        }));
        let coord = ScrollCoordinator::new(Box::new(FakeBackground(Rc::clone(&state))));
        (coord, state)
    }

    #[test]
    fn save_hides_and_restore_jumps_back() {
        let (mut coord, bg) = coordinator(640.0);
        assert!(coord.on_became_non_empty(RecordKey::from_raw(0)));
        assert!(bg.borrow().hidden);
        assert_eq!(coord.state(), ScrollState::Saved { offset: 640.0 });

        bg.borrow_mut().offset = 0.0;
        assert!(coord.on_became_empty());
        let bg = bg.borrow();
        assert!(!bg.hidden);
        assert_eq!(bg.jumps, vec![640.0]);
        assert_eq!(coord.state(), ScrollState::Unsaved);
    }

    #[test]
    fn repeated_edges_do_not_nest() {
        let (mut coord, bg) = coordinator(100.0);
        assert!(coord.on_became_non_empty(RecordKey::from_raw(0)));
        bg.borrow_mut().offset = 999.0;
        assert!(!coord.on_became_non_empty(RecordKey::from_raw(1)));
        assert_eq!(bg.borrow().hide_calls, 1);

        assert!(coord.on_became_empty());
        assert!(!coord.on_became_empty());
        assert_eq!(bg.borrow().jumps, vec![100.0]);
        assert_eq!(
            coord.stats(),
            ScrollStats {
                saves: 1,
                restores: 1
            }
        );
    }

    #[test]
    fn restore_without_save_is_noop() {
        let (mut coord, bg) = coordinator(50.0);
        assert!(!coord.on_became_empty());
        assert!(bg.borrow().jumps.is_empty());
    }

    #[test]
    fn reset_restores_pending_offset() {
        let (mut coord, bg) = coordinator(30.0);
        coord.on_became_non_empty(RecordKey::from_raw(0));
        coord.reset();
        assert!(!bg.borrow().hidden);
        assert_eq!(bg.borrow().jumps, vec![30.0]);
        assert_eq!(coord.stats(), ScrollStats::default());
    }
}
