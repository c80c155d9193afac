#![forbid(unsafe_code)]

//! Host capabilities the engine drives.
//!
//! The algorithms never touch a document directly. They need an overlay node
//! that can be attached, styled active/inactive, filled, and detached, plus a
//! background view whose scroll offset can be read and restored.

use strata_core::{ContentId, NodeBody, RecordKey};

/// Visual node of one overlay record.
///
/// The owning stack guarantees `attach` is called once before any styling
/// and `detach` is called at most once, after which the node is dropped.
pub trait VisualNode {
    /// Insert the node into the document with no active styling.
    fn attach(&mut self);

    /// Toggle the active style; turning it on starts the enter transition,
    /// turning it off starts the exit transition.
    fn set_active_style(&mut self, active: bool);

    /// Replace the node's body (loading placeholder, content, or error view).
    fn present(&mut self, body: &NodeBody);

    /// Remove the node from the document.
    fn detach(&mut self);
}

/// Creates visual nodes for new overlay records.
pub trait NodeFactory {
    fn create(&mut self, key: RecordKey, id: &ContentId) -> Box<dyn VisualNode>;
}

/// The background list view behind the overlays.
pub trait BackgroundView {
    /// Current vertical scroll offset in pixels.
    fn scroll_offset(&self) -> f64;

    /// Remove the view from layout and interaction (`true`) or restore it.
    fn set_hidden(&mut self, hidden: bool);

    /// Jump to `offset` without smooth scrolling.
    fn jump_to(&mut self, offset: f64);
}
