#![forbid(unsafe_code)]

//! Recording document model.
//!
//! Tracks every overlay node the engine creates and the background view, so
//! tests can assert on what a user would see: which nodes are in the
//! document, which carry the active style, and where the list is scrolled.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use strata_core::{ContentId, NodeBody, RecordKey};
use strata_nav::{BackgroundView, NodeFactory, VisualNode};

/// Observable state of one overlay node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: ContentId,
    pub attached: bool,
    pub active: bool,
    pub body: Option<NodeBody>,
    pub attaches: u32,
    pub detaches: u32,
    /// `set_active_style(true)` seen before `attach`.
    pub styled_before_attach: bool,
}

/// Background list state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundViewState {
    pub offset: f64,
    pub hidden: bool,
    pub hides: u32,
    pub shows: u32,
    pub jumps: Vec<f64>,
}

#[derive(Debug, Default)]
struct Document {
    nodes: BTreeMap<RecordKey, NodeView>,
    background: BackgroundViewState,
}

/// Shared handle to the recorded document.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface(Rc<RefCell<Document>>);

struct RecordingNode {
    key: RecordKey,
    doc: Rc<RefCell<Document>>,
}

impl RecordingNode {
    fn with(&self, f: impl FnOnce(&mut NodeView)) {
        if let Some(view) = self.doc.borrow_mut().nodes.get_mut(&self.key) {
            f(view);
        }
    }
}

impl VisualNode for RecordingNode {
    fn attach(&mut self) {
        self.with(|v| {
            v.attached = true;
            v.attaches += 1;
        });
    }

    fn set_active_style(&mut self, active: bool) {
        self.with(|v| {
            if active && !v.attached {
                v.styled_before_attach = true;
            }
            v.active = active;
        });
    }

    fn present(&mut self, body: &NodeBody) {
        let body = body.clone();
        self.with(|v| v.body = Some(body));
    }

    fn detach(&mut self) {
        self.with(|v| {
            v.attached = false;
            v.active = false;
            v.detaches += 1;
        });
    }
}

impl NodeFactory for RecordingSurface {
    fn create(&mut self, key: RecordKey, id: &ContentId) -> Box<dyn VisualNode> {
        self.0.borrow_mut().nodes.insert(
            key,
            NodeView {
                id: id.clone(),
                attached: false,
                active: false,
                body: None,
                attaches: 0,
                detaches: 0,
                styled_before_attach: false,
            },
        );
        Box::new(RecordingNode {
            key,
            doc: Rc::clone(&self.0),
        })
    }
}

impl BackgroundView for RecordingSurface {
    fn scroll_offset(&self) -> f64 {
        self.0.borrow().background.offset
    }

    fn set_hidden(&mut self, hidden: bool) {
        let mut doc = self.0.borrow_mut();
        let bg = &mut doc.background;
        bg.hidden = hidden;
        if hidden {
            bg.hides += 1;
        } else {
            bg.shows += 1;
        }
    }

    fn jump_to(&mut self, offset: f64) {
        let mut doc = self.0.borrow_mut();
        doc.background.offset = offset;
        doc.background.jumps.push(offset);
    }
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// User scrolls the background list.
    pub fn scroll_background_to(&self, offset: f64) {
        self.0.borrow_mut().background.offset = offset;
    }

    pub fn background(&self) -> BackgroundViewState {
        self.0.borrow().background.clone()
    }

    pub fn node(&self, key: RecordKey) -> Option<NodeView> {
        self.0.borrow().nodes.get(&key).cloned()
    }

    /// Every node ever created, in creation order.
    pub fn nodes(&self) -> Vec<(RecordKey, NodeView)> {
        self.0
            .borrow()
            .nodes
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }

    /// Attached nodes, bottom to top.
    pub fn attached(&self) -> Vec<(RecordKey, NodeView)> {
        self.nodes().into_iter().filter(|(_, v)| v.attached).collect()
    }

    /// Ids of attached nodes carrying the active style, bottom to top.
    pub fn visible_ids(&self) -> Vec<String> {
        self.attached()
            .into_iter()
            .filter(|(_, v)| v.active)
            .map(|(_, v)| v.id.into_string())
            .collect()
    }

    /// Lifecycle hygiene violations across every node ever created.
    pub fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (key, view) in self.nodes() {
            if view.attaches > 1 {
                out.push(format!("{key} attached {} times", view.attaches));
            }
            if view.detaches > 1 {
                out.push(format!("{key} detached {} times", view.detaches));
            }
            if view.styled_before_attach {
                out.push(format!("{key} styled active before attach"));
            }
        }
        out
    }
}
