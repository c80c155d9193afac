#![forbid(unsafe_code)]

//! Overlay-stack navigation engine.
//!
//! # Role in Strata
//! `strata-nav` keeps an in-page stack of layered detail views in agreement
//! with session history across opens, closes, nested re-opens, back/forward
//! traversal, and interrupted exit transitions. Hosts drive it through a
//! single [`Navigator`]; everything platform-specific sits behind the traits
//! in [`surface`], [`content`] and [`history`].
//!
//! # Components (leaves first)
//! - [`TransitionScheduler`]: attach → frame → active, close → timer → detach.
//! - [`ScrollCoordinator`]: one background save/restore per empty edge.
//! - [`OverlayStack`]: push, close, reconcile, fetch completion.
//! - [`HistoryBridge`]: the only code that touches session history.
//! - [`SwipeTracker`]: swipe-to-close on the top overlay.
//!
//! # Settled invariant
//! Whenever no transition is in flight, the top live record's id equals the
//! location's id parameter, or the stack is empty and the location has none.

pub mod content;
pub mod history;
pub mod navigator;
pub mod record;
pub mod route;
pub mod scroll;
pub mod stack;
pub mod surface;
pub mod swipe;
pub mod transition;

#[cfg(test)]
mod testing;

pub use content::{ContentProvider, ContentRenderer, FetchOutcome};
pub use history::{CloseRoute, HistoryBridge, HistoryState, SessionHistory};
pub use navigator::Navigator;
pub use record::{ContentState, Lifecycle, OverlayRecord};
pub use route::{RouteCodec, RouteError};
pub use scroll::{ScrollCoordinator, ScrollState, ScrollStats};
pub use stack::{Collaborators, Delivery, OverlayStack, PushOutcome, ReconcileOutcome, StackStats};
pub use surface::{BackgroundView, NodeFactory, VisualNode};
pub use swipe::{SwipeOutcome, SwipeTracker, Touch};
pub use transition::TransitionScheduler;
