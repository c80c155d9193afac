//! Recording fakes for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use strata_core::{ContentError, ContentId, FetchTicket, Fragment, NodeBody, Payload, RecordKey};

use crate::content::{ContentProvider, ContentRenderer};
use crate::history::{HistoryState, SessionHistory};
use crate::stack::Collaborators;
use crate::surface::{BackgroundView, NodeFactory, VisualNode};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeOp {
    Attach,
    Active(bool),
    Present(&'static str),
    Detach,
}

pub type NodeLog = Rc<RefCell<Vec<(RecordKey, NodeOp)>>>;

struct RecordingNode {
    key: RecordKey,
    log: NodeLog,
}

impl VisualNode for RecordingNode {
    fn attach(&mut self) {
        self.log.borrow_mut().push((self.key, NodeOp::Attach));
    }

    fn set_active_style(&mut self, active: bool) {
        self.log.borrow_mut().push((self.key, NodeOp::Active(active)));
    }

    fn present(&mut self, body: &NodeBody) {
        let kind = match body {
            NodeBody::Loading => "loading",
            NodeBody::Ready(_) => "ready",
            NodeBody::Failed { .. } => "failed",
        };
        self.log.borrow_mut().push((self.key, NodeOp::Present(kind)));
    }

    fn detach(&mut self) {
        self.log.borrow_mut().push((self.key, NodeOp::Detach));
    }
}

pub struct RecordingFactory {
    pub log: NodeLog,
}

impl NodeFactory for RecordingFactory {
    fn create(&mut self, key: RecordKey, _id: &ContentId) -> Box<dyn VisualNode> {
        Box::new(RecordingNode {
            key,
            log: Rc::clone(&self.log),
        })
    }
}

#[derive(Debug, Default)]
pub struct BackgroundState {
    pub offset: f64,
    pub hidden: bool,
    pub hide_calls: usize,
    pub jumps: Vec<f64>,
}

pub struct FakeBackground(pub Rc<RefCell<BackgroundState>>);

impl BackgroundView for FakeBackground {
    fn scroll_offset(&self) -> f64 {
        self.0.borrow().offset
    }

    fn set_hidden(&mut self, hidden: bool) {
        let mut state = self.0.borrow_mut();
        state.hidden = hidden;
        if hidden {
            state.hide_calls += 1;
        }
    }

    fn jump_to(&mut self, offset: f64) {
        let mut state = self.0.borrow_mut();
        state.offset = offset;
        state.jumps.push(offset);
    }
}

pub type FetchLog = Rc<RefCell<Vec<(FetchTicket, ContentId)>>>;

pub struct QueueProvider(pub FetchLog);

impl ContentProvider for QueueProvider {
    fn request(&mut self, ticket: FetchTicket, id: &ContentId) {
        self.0.borrow_mut().push((ticket, id.clone()));
    }
}

pub struct EchoRenderer;

impl ContentRenderer for EchoRenderer {
    fn render(&self, payload: &Payload) -> Result<Fragment, ContentError> {
        if payload.body() == "malformed" {
            return Err(ContentError::Render("malformed payload".into()));
        }
        Ok(Fragment::new(format!("<article>{}</article>", payload.body())))
    }

    fn error_view(&self, error: &ContentError) -> Fragment {
        Fragment::new(format!("<div class=\"error\">{}</div>", error.kind()))
    }
}

/// Handles to everything a test may want to inspect.
pub struct Fakes {
    pub nodes: NodeLog,
    pub background: Rc<RefCell<BackgroundState>>,
    pub fetches: FetchLog,
}

impl Fakes {
    pub fn new(scroll_offset: f64) -> (Self, Collaborators) {
        let nodes: NodeLog = Rc::default();
        let background = Rc::new(RefCell::new(BackgroundState {
            offset: scroll_offset,
            ..BackgroundState::default()
        }));
        let fetches: FetchLog = Rc::default();
        let collaborators = Collaborators {
            nodes: Box::new(RecordingFactory {
                log: Rc::clone(&nodes),
            }),
            provider: Box::new(QueueProvider(Rc::clone(&fetches))),
            renderer: Box::new(EchoRenderer),
            background: Box::new(FakeBackground(Rc::clone(&background))),
        };
        (
            Self {
                nodes,
                background,
                fetches,
            },
            collaborators,
        )
    }

    pub fn ops_for(&self, key: RecordKey) -> Vec<NodeOp> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, op)| op.clone())
            .collect()
    }

    pub fn last_ticket(&self) -> FetchTicket {
        self.fetches.borrow().last().map(|(t, _)| *t).expect("no fetch issued")
    }
}

/// In-memory session history that mirrors browser semantics closely enough
/// for bridge tests: push truncates forward entries, `back` only queues the
/// traversal. The cursor moves when the test applies it with
/// [`HistoryLog::traverse_back`] and then delivers popstate.
#[derive(Debug, Default)]
pub struct HistoryLog {
    pub entries: Vec<(Option<HistoryState>, String)>,
    pub index: usize,
    pub pushes: usize,
    pub replaces: usize,
    pub backs: usize,
    pub queued_backs: usize,
}

pub struct FakeHistory(pub Rc<RefCell<HistoryLog>>);

impl FakeHistory {
    pub fn at(url: &str) -> (Self, Rc<RefCell<HistoryLog>>) {
        let log = Rc::new(RefCell::new(HistoryLog {
            entries: vec![(None, url.to_owned())],
            ..HistoryLog::default()
        }));
        (Self(Rc::clone(&log)), log)
    }
}

impl SessionHistory for FakeHistory {
    fn location(&self) -> String {
        let log = self.0.borrow();
        log.entries[log.index].1.clone()
    }

    fn state(&self) -> Option<HistoryState> {
        let log = self.0.borrow();
        log.entries[log.index].0.clone()
    }

    fn push_state(&mut self, state: &HistoryState, url: &str) {
        let mut log = self.0.borrow_mut();
        let keep = log.index + 1;
        log.entries.truncate(keep);
        log.entries.push((Some(state.clone()), url.to_owned()));
        log.index += 1;
        log.pushes += 1;
    }

    fn replace_state(&mut self, state: &HistoryState, url: &str) {
        let mut log = self.0.borrow_mut();
        let index = log.index;
        log.entries[index] = (Some(state.clone()), url.to_owned());
        log.replaces += 1;
    }

    fn back(&mut self) {
        let mut log = self.0.borrow_mut();
        log.backs += 1;
        log.queued_backs += 1;
    }
}

impl HistoryLog {
    /// Apply one queued `back`, as the browser does before firing popstate.
    pub fn traverse_back(&mut self) -> bool {
        if self.queued_backs == 0 {
            return false;
        }
        self.queued_backs -= 1;
        if self.index > 0 {
            self.index -= 1;
        }
        true
    }

    /// Move the cursor forward, as the browser's forward button does.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 < self.entries.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}
