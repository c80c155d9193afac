#![forbid(unsafe_code)]

//! Content error taxonomy.
//!
//! Every variant is scoped to a single overlay record. None of them is fatal:
//! a failed record shows an inline error view and can always be closed.

use thiserror::Error;

/// Why an overlay's content could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The identifier has no corresponding content.
    #[error("content not found")]
    NotFound,
    /// The fetch failed or returned a non-success response.
    #[error("network error: {0}")]
    Network(String),
    /// The payload arrived but could not be rendered.
    #[error("render error: {0}")]
    Render(String),
}

impl ContentError {
    /// Stable short name, used in logs and host messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Network(_) => "network",
            Self::Render(_) => "render",
        }
    }

    /// Whether retrying the same fetch could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
