#![forbid(unsafe_code)]

//! Host command queue.
//!
//! The engine never calls into the page. Every effect it wants (attach a
//! node, push a history entry, start a fetch) is appended to a shared
//! [`CommandQueue`] as a [`HostCommand`]; the host drains the queue after
//! each event and applies the commands in order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::Serialize;
use strata_core::{ContentId, NodeBody, RecordKey};
use strata_nav::HistoryState;

/// Body presented by an overlay node, in host form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyView {
    Loading,
    Ready { html: String },
    Failed { error: &'static str, html: String },
}

impl From<&NodeBody> for BodyView {
    fn from(body: &NodeBody) -> Self {
        match body {
            NodeBody::Loading => Self::Loading,
            NodeBody::Ready(fragment) => Self::Ready {
                html: fragment.as_str().to_owned(),
            },
            NodeBody::Failed { error, view } => Self::Failed {
                error: error.kind(),
                html: view.as_str().to_owned(),
            },
        }
    }
}

/// One effect for the host to apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCommand {
    AttachNode { record: RecordKey, id: ContentId },
    SetActive { record: RecordKey, active: bool },
    Present { record: RecordKey, body: BodyView },
    DetachNode { record: RecordKey },
    HideBackground { hidden: bool },
    ScrollTo { offset: f64 },
    Fetch { record: RecordKey, attempt: u32, id: ContentId },
    PushState { state: HistoryState, url: String },
    ReplaceState { state: HistoryState, url: String },
    HistoryBack,
    FollowSwipe { dx: f32 },
    SnapBack,
}

/// Shared FIFO of host commands.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue(Rc<RefCell<VecDeque<HostCommand>>>);

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: HostCommand) {
        self.0.borrow_mut().push_back(command);
    }

    /// Take every pending command, oldest first.
    pub fn drain(&self) -> Vec<HostCommand> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
