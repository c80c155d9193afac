#![forbid(unsafe_code)]

//! Test harness for the Strata navigation engine.
//!
//! Provides a [`SimulatedBrowser`] with real session-history semantics, a
//! [`RecordingSurface`] that models the document, [`ScriptedContent`] for
//! controlled fetch timing, and a [`Scenario`] driver that ties them to a
//! `Navigator` under a deterministic clock.
//!
//! Scenarios are expressed as [`Step`]s so property tests can generate them
//! and failures can be replayed from the JSONL transcript.

pub mod browser;
pub mod content;
pub mod scenario;
pub mod surface;

pub use browser::{Entry, HistoryCalls, SimulatedBrowser};
pub use content::{ArticleRenderer, PendingFetch, Script, ScriptedContent};
pub use scenario::{Scenario, Step};
pub use surface::{BackgroundViewState, NodeView, RecordingSurface};
