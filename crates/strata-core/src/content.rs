#![forbid(unsafe_code)]

//! Content values passed between the provider, the renderer, and overlay
//! nodes.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Raw content returned by a content provider.
///
/// The engine never inspects the body; only the renderer does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(String);

impl Payload {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    #[inline]
    pub fn body(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Displayable output of the renderer, opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(String);

impl Fragment {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// What an overlay node currently presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    /// Placeholder while the fetch is in flight.
    Loading,
    /// Rendered content.
    Ready(Fragment),
    /// Inline error view with retry/close actions.
    Failed { error: ContentError, view: Fragment },
}

impl NodeBody {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
