#![forbid(unsafe_code)]

//! Swipe-to-close recognition for the top overlay.
//!
//! # State Machine
//!
//! ```text
//! Idle ──Start──► Undecided ──dx > lock && dx > |dy|──► Dragging ──End──► Idle
//!                     │                                       (Dismiss | SnapBack)
//!                     └──────|dy| > lock──► Scrolling ──End──► Idle
//! ```
//!
//! # Invariants
//!
//! 1. A gesture locks to exactly one of drag or scroll and never switches.
//! 2. Only a rightward drag moves the overlay (`Follow(dx)` with `dx > 0`).
//! 3. `Dismiss` is emitted only from `Dragging`, when the release point is
//!    more than `dismiss_fraction` of the viewport width from the start.
//! 4. Every `End` returns the tracker to `Idle`.

use strata_core::SwipeConfig;

/// Raw touch input, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Touch {
    Start { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    End { x: f32, viewport_width: f32 },
}

/// What the host should do in response to a touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeOutcome {
    /// Nothing to apply.
    None,
    /// Translate the overlay by `dx` pixels and prevent the default action.
    Follow(f32),
    /// Animate the overlay back to its resting position.
    SnapBack,
    /// Close the top overlay.
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Phase {
    #[default]
    Idle,
    Undecided { x: f32, y: f32 },
    Dragging { x: f32 },
    Scrolling,
}

/// Horizontal swipe recognizer.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    config: SwipeConfig,
    phase: Phase,
}

impl SwipeTracker {
    #[must_use]
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    pub fn process(&mut self, touch: Touch) -> SwipeOutcome {
        match touch {
            Touch::Start { x, y } => {
                self.phase = Phase::Undecided { x, y };
                SwipeOutcome::None
            }
            Touch::Move { x, y } => self.on_move(x, y),
            Touch::End { x, viewport_width } => {
                let phase = std::mem::take(&mut self.phase);
                match phase {
                    Phase::Dragging { x: start } => {
                        let dx = x - start;
                        if dx > viewport_width * self.config.dismiss_fraction {
                            SwipeOutcome::Dismiss
                        } else {
                            SwipeOutcome::SnapBack
                        }
                    }
                    _ => SwipeOutcome::None,
                }
            }
        }
    }

    fn on_move(&mut self, x: f32, y: f32) -> SwipeOutcome {
        let lock = self.config.lock_threshold_px;
        match self.phase {
            Phase::Undecided { x: sx, y: sy } => {
                let dx = x - sx;
                let dy = (y - sy).abs();
                if dx > lock && dx > dy {
                    self.phase = Phase::Dragging { x: sx };
                    SwipeOutcome::Follow(dx)
                } else {
                    if dy > lock {
                        self.phase = Phase::Scrolling;
                    }
                    SwipeOutcome::None
                }
            }
            Phase::Dragging { x: sx } => {
                let dx = x - sx;
                if dx > 0.0 {
                    SwipeOutcome::Follow(dx)
                } else {
                    SwipeOutcome::None
                }
            }
            Phase::Idle | Phase::Scrolling => SwipeOutcome::None,
        }
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    #[inline]
    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SwipeTracker {
        SwipeTracker::new(SwipeConfig::default())
    }

    #[test]
    fn horizontal_drag_follows_and_dismisses() {
        let mut t = tracker();
        assert_eq!(t.process(Touch::Start { x: 10.0, y: 100.0 }), SwipeOutcome::None);
        assert_eq!(t.process(Touch::Move { x: 15.0, y: 101.0 }), SwipeOutcome::None);
        assert_eq!(
            t.process(Touch::Move { x: 40.0, y: 102.0 }),
            SwipeOutcome::Follow(30.0)
        );
        assert!(t.is_dragging());
        assert_eq!(
            t.process(Touch::Move { x: 160.0, y: 140.0 }),
            SwipeOutcome::Follow(150.0)
        );
        assert_eq!(
            t.process(Touch::End {
                x: 200.0,
                viewport_width: 400.0
            }),
            SwipeOutcome::Dismiss
        );
        assert!(!t.is_dragging());
    }

    #[test]
    fn short_drag_snaps_back() {
        let mut t = tracker();
        t.process(Touch::Start { x: 0.0, y: 0.0 });
        t.process(Touch::Move { x: 50.0, y: 0.0 });
        assert_eq!(
            t.process(Touch::End {
                x: 120.0,
                viewport_width: 400.0
            }),
            SwipeOutcome::SnapBack
        );
    }

    #[test]
    fn exactly_threshold_does_not_dismiss() {
        let mut t = tracker();
        t.process(Touch::Start { x: 0.0, y: 0.0 });
        t.process(Touch::Move { x: 20.0, y: 0.0 });
        assert_eq!(
            t.process(Touch::End {
                x: 150.0,
                viewport_width: 500.0
            }),
            SwipeOutcome::SnapBack
        );
    }

    #[test]
    fn vertical_movement_locks_to_scroll() {
        let mut t = tracker();
        t.process(Touch::Start { x: 0.0, y: 0.0 });
        assert_eq!(t.process(Touch::Move { x: 2.0, y: 30.0 }), SwipeOutcome::None);
        assert_eq!(t.process(Touch::Move { x: 300.0, y: 30.0 }), SwipeOutcome::None);
        assert_eq!(
            t.process(Touch::End {
                x: 300.0,
                viewport_width: 400.0
            }),
            SwipeOutcome::None
        );
    }

    #[test]
    fn leftward_drag_never_follows() {
        let mut t = tracker();
        t.process(Touch::Start { x: 200.0, y: 0.0 });
        assert_eq!(t.process(Touch::Move { x: 150.0, y: 0.0 }), SwipeOutcome::None);
        assert!(!t.is_dragging());

        t.process(Touch::Start { x: 0.0, y: 0.0 });
        t.process(Touch::Move { x: 20.0, y: 0.0 });
        assert_eq!(t.process(Touch::Move { x: -5.0, y: 0.0 }), SwipeOutcome::None);
    }

    #[test]
    fn diagonal_past_lock_with_larger_dy_scrolls() {
        let mut t = tracker();
        t.process(Touch::Start { x: 0.0, y: 0.0 });
        assert_eq!(t.process(Touch::Move { x: 12.0, y: 20.0 }), SwipeOutcome::None);
        assert!(!t.is_dragging());
        assert_eq!(t.process(Touch::Move { x: 200.0, y: 20.0 }), SwipeOutcome::None);
    }

    #[test]
    fn end_without_start_is_noop() {
        let mut t = tracker();
        assert_eq!(
            t.process(Touch::End {
                x: 400.0,
                viewport_width: 400.0
            }),
            SwipeOutcome::None
        );
    }
}
