#![forbid(unsafe_code)]

//! Core: identifiers, host clock, timers, error taxonomy, and configuration.
//!
//! # Role in Strata
//! `strata-core` holds the vocabulary every other crate speaks. It has no
//! knowledge of stacks or history; `strata-nav` builds the navigation engine
//! on top of these types and `strata-web` adapts it to a browser host.
//!
//! # Primary responsibilities
//! - **Identity**: [`ContentId`] (what is shown) vs [`RecordKey`] (which
//!   overlay instance), plus [`FetchTicket`] for fetch correlation.
//! - **Time**: the [`Clock`] trait and the host-driven [`DeterministicClock`].
//! - **Timers**: [`TimerQueue`], deadline timers with cancellable handles.
//! - **Errors**: [`ContentError`], scoped to a single overlay.
//! - **Config**: [`NavConfig`] with optional TOML/JSON loading.

pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod id;
pub mod timer;

pub use clock::{Clock, DeterministicClock, MonotonicClock};
pub use config::{ConfigError, NavConfig, SwipeConfig};
pub use content::{Fragment, NodeBody, Payload};
pub use error::ContentError;
pub use id::{ContentId, FetchTicket, RecordKey};
pub use timer::{TimerHandle, TimerQueue, TimerStats};
