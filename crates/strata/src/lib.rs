#![forbid(unsafe_code)]

//! Strata public facade crate.
//!
//! Re-exports the engine types from the internal crates and offers a small
//! prelude. Hosts without a browser implement the collaborator traits
//! ([`NodeFactory`], [`BackgroundView`], [`ContentProvider`],
//! [`ContentRenderer`], [`SessionHistory`]) and drive a [`Navigator`]
//! directly; browser hosts use [`web::WebNavigator`] (feature `web`).

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use strata_core::{
    Clock, ConfigError, ContentError, ContentId, DeterministicClock, FetchTicket, Fragment,
    MonotonicClock, NavConfig, NodeBody, Payload, RecordKey, SwipeConfig,
};

// --- Engine re-exports -----------------------------------------------------

pub use strata_nav::{
    BackgroundView, CloseRoute, Collaborators, ContentProvider, ContentRenderer, ContentState,
    Delivery, FetchOutcome, HistoryState, Lifecycle, Navigator, NodeFactory, PushOutcome,
    ReconcileOutcome, RouteError, SessionHistory, SwipeOutcome, Touch, VisualNode,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error for hosts that do not care which layer failed.
#[derive(Debug)]
pub enum Error {
    /// Configuration rejected at construction.
    Config(ConfigError),
    /// Location could not be parsed or rebuilt.
    Route(RouteError),
    /// Host event could not be decoded or applied.
    #[cfg(feature = "web")]
    Web(strata_web::WebError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Route(err) => write!(f, "route: {err}"),
            #[cfg(feature = "web")]
            Self::Web(err) => write!(f, "web: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Route(err) => Some(err),
            #[cfg(feature = "web")]
            Self::Web(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<RouteError> for Error {
    fn from(err: RouteError) -> Self {
        Self::Route(err)
    }
}

#[cfg(feature = "web")]
impl From<strata_web::WebError> for Error {
    fn from(err: strata_web::WebError) -> Self {
        Self::Web(err)
    }
}

/// Standard result type for Strata APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CloseRoute, Collaborators, ContentId, Error, HistoryState, NavConfig, Navigator,
        PushOutcome, RecordKey, Result, SessionHistory,
    };

    pub use crate::{core, nav};

    #[cfg(feature = "web")]
    pub use crate::web;
}

pub use strata_core as core;
pub use strata_nav as nav;
#[cfg(feature = "web")]
pub use strata_web as web;
