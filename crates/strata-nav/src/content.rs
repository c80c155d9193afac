#![forbid(unsafe_code)]

//! Content collaborators.
//!
//! Fetching is asynchronous from the engine's point of view: the provider is
//! handed a [`FetchTicket`] and the host later reports the outcome through
//! `Navigator::deliver`. Completions are matched by ticket, never by content
//! id, so two records showing the same id never receive each other's data.

use strata_core::{ContentError, ContentId, FetchTicket, Fragment, Payload};

/// Starts content fetches.
pub trait ContentProvider {
    /// Begin fetching `id`; the result must be delivered with `ticket`.
    fn request(&mut self, ticket: FetchTicket, id: &ContentId);
}

/// Turns payloads into displayable fragments.
pub trait ContentRenderer {
    /// Render a payload. A malformed payload yields [`ContentError::Render`].
    fn render(&self, payload: &Payload) -> Result<Fragment, ContentError>;

    /// Fixed inline error view offering retry and close actions.
    fn error_view(&self, error: &ContentError) -> Fragment;
}

/// Outcome reported by the host for a fetch.
pub type FetchOutcome = Result<Payload, ContentError>;
