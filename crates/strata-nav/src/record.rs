#![forbid(unsafe_code)]

//! Overlay records.
//!
//! A record is one open instance of a detail view. The stack owns it (and its
//! visual node) from creation until it is `Removed`.

use strata_core::{ContentError, ContentId, FetchTicket, NodeBody, Payload, RecordKey, TimerHandle};

use crate::surface::VisualNode;

/// Lifecycle of an overlay record.
///
/// State machine: Opening → Active → Closing → Removed
///
/// `Opening` may go straight to `Closing` when a close arrives before the
/// first animation frame. `Removed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Attached, waiting for the next frame to receive its active style.
    #[default]
    Opening,
    /// Fully shown.
    Active,
    /// Exit transition running; removal timer pending.
    Closing,
    /// Detached and dropped from the stack.
    Removed,
}

impl Lifecycle {
    /// Opening or Active: counts toward the live stack.
    #[inline]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Opening | Self::Active)
    }

    /// Whether a transition is running.
    #[inline]
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// Content state of a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentState {
    #[default]
    Empty,
    Loading,
    Ready(Payload),
    Failed(ContentError),
}

/// One overlay instance.
pub struct OverlayRecord {
    pub(crate) id: ContentId,
    pub(crate) key: RecordKey,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) content: ContentState,
    pub(crate) ticket: FetchTicket,
    pub(crate) settle_timer: Option<TimerHandle>,
    pub(crate) node: Option<Box<dyn VisualNode>>,
}

impl std::fmt::Debug for OverlayRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRecord")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("lifecycle", &self.lifecycle)
            .field("content", &self.content)
            .field("settle_timer", &self.settle_timer)
            .field("attached", &self.node.is_some())
            .finish()
    }
}

impl OverlayRecord {
    pub(crate) fn new(id: ContentId, key: RecordKey, node: Box<dyn VisualNode>) -> Self {
        Self {
            id,
            key,
            lifecycle: Lifecycle::Opening,
            content: ContentState::Empty,
            ticket: FetchTicket::first(key),
            settle_timer: None,
            node: Some(node),
        }
    }

    #[inline]
    pub fn id(&self) -> &ContentId {
        &self.id
    }

    #[inline]
    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// Stack position; strictly increasing bottom to top, never reused.
    #[inline]
    pub fn position(&self) -> u64 {
        self.key.raw()
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn content(&self) -> &ContentState {
        &self.content
    }

    /// Ticket of the fetch currently expected for this record.
    #[inline]
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    /// Pending removal timer, present only while `Closing`.
    #[inline]
    pub fn settle_timer(&self) -> Option<TimerHandle> {
        self.settle_timer
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.lifecycle.is_live()
    }

    /// Whether the visual node is still in the document.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.node.is_some()
    }

    pub(crate) fn present(&mut self, body: &NodeBody) {
        if let Some(node) = self.node.as_mut() {
            node.present(body);
        }
    }
}
