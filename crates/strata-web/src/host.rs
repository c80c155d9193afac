#![forbid(unsafe_code)]

//! Collaborator implementations backed by the command queue.
//!
//! Queries the engine makes synchronously (current location, history state,
//! background scroll offset) are answered from [`PageState`], which the host
//! keeps current by sending events. Everything else becomes a
//! [`HostCommand`].

use std::cell::RefCell;
use std::rc::Rc;

use strata_core::{ContentError, ContentId, FetchTicket, Fragment, NodeBody, Payload, RecordKey};
use strata_nav::{
    BackgroundView, Collaborators, ContentProvider, ContentRenderer, HistoryState, NodeFactory,
    SessionHistory, VisualNode,
};

use crate::command::{BodyView, CommandQueue, HostCommand};

/// Page facts mirrored from the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    pub location: String,
    pub state: Option<HistoryState>,
    pub scroll_offset: f64,
}

pub type SharedPage = Rc<RefCell<PageState>>;

struct HostNode {
    record: RecordKey,
    id: ContentId,
    commands: CommandQueue,
}

impl VisualNode for HostNode {
    fn attach(&mut self) {
        self.commands.push(HostCommand::AttachNode {
            record: self.record,
            id: self.id.clone(),
        });
    }

    fn set_active_style(&mut self, active: bool) {
        self.commands.push(HostCommand::SetActive {
            record: self.record,
            active,
        });
    }

    fn present(&mut self, body: &NodeBody) {
        self.commands.push(HostCommand::Present {
            record: self.record,
            body: BodyView::from(body),
        });
    }

    fn detach(&mut self) {
        self.commands.push(HostCommand::DetachNode {
            record: self.record,
        });
    }
}

struct HostNodes(CommandQueue);

impl NodeFactory for HostNodes {
    fn create(&mut self, key: RecordKey, id: &ContentId) -> Box<dyn VisualNode> {
        Box::new(HostNode {
            record: key,
            id: id.clone(),
            commands: self.0.clone(),
        })
    }
}

struct HostBackground {
    page: SharedPage,
    commands: CommandQueue,
}

impl BackgroundView for HostBackground {
    fn scroll_offset(&self) -> f64 {
        self.page.borrow().scroll_offset
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.commands.push(HostCommand::HideBackground { hidden });
    }

    fn jump_to(&mut self, offset: f64) {
        self.page.borrow_mut().scroll_offset = offset;
        self.commands.push(HostCommand::ScrollTo { offset });
    }
}

struct HostFetcher(CommandQueue);

impl ContentProvider for HostFetcher {
    fn request(&mut self, ticket: FetchTicket, id: &ContentId) {
        self.0.push(HostCommand::Fetch {
            record: ticket.record,
            attempt: ticket.attempt,
            id: id.clone(),
        });
    }
}

/// Treats payloads as pre-rendered HTML.
///
/// The host's template layer has already produced markup; an empty body is
/// the only malformed payload this renderer can detect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupRenderer;

impl ContentRenderer for MarkupRenderer {
    fn render(&self, payload: &Payload) -> Result<Fragment, ContentError> {
        if payload.body().trim().is_empty() {
            return Err(ContentError::Render("empty payload".into()));
        }
        Ok(Fragment::new(payload.body()))
    }

    fn error_view(&self, error: &ContentError) -> Fragment {
        let message = match error {
            ContentError::NotFound => "This item is no longer available.",
            ContentError::Network(_) => "Could not load this item.",
            ContentError::Render(_) => "This item could not be displayed.",
        };
        Fragment::new(format!(
            concat!(
                "<div class=\"overlay-error\" data-error=\"{kind}\">",
                "<p>{message}</p>",
                "<button data-action=\"retry\">Retry</button>",
                "<button data-action=\"close\">Close</button>",
                "</div>"
            ),
            kind = error.kind(),
            message = message,
        ))
    }
}

/// Session history mirrored from the page.
///
/// Push and replace update the mirror synchronously, as the browser does.
/// `back` only emits a command; the location changes when the host reports
/// the resulting popstate.
struct HostHistory {
    page: SharedPage,
    commands: CommandQueue,
}

impl SessionHistory for HostHistory {
    fn location(&self) -> String {
        self.page.borrow().location.clone()
    }

    fn state(&self) -> Option<HistoryState> {
        self.page.borrow().state.clone()
    }

    fn push_state(&mut self, state: &HistoryState, url: &str) {
        {
            let mut page = self.page.borrow_mut();
            page.location = url.to_owned();
            page.state = Some(state.clone());
        }
        self.commands.push(HostCommand::PushState {
            state: state.clone(),
            url: url.to_owned(),
        });
    }

    fn replace_state(&mut self, state: &HistoryState, url: &str) {
        {
            let mut page = self.page.borrow_mut();
            page.location = url.to_owned();
            page.state = Some(state.clone());
        }
        self.commands.push(HostCommand::ReplaceState {
            state: state.clone(),
            url: url.to_owned(),
        });
    }

    fn back(&mut self) {
        self.commands.push(HostCommand::HistoryBack);
    }
}

/// Build every collaborator the engine needs, all writing to `commands`.
pub fn host_collaborators(
    page: &SharedPage,
    commands: &CommandQueue,
) -> (Collaborators, Box<dyn SessionHistory>) {
    let collaborators = Collaborators {
        nodes: Box::new(HostNodes(commands.clone())),
        provider: Box::new(HostFetcher(commands.clone())),
        renderer: Box::new(MarkupRenderer),
        background: Box::new(HostBackground {
            page: Rc::clone(page),
            commands: commands.clone(),
        }),
    };
    let history = Box::new(HostHistory {
        page: Rc::clone(page),
        commands: commands.clone(),
    });
    (collaborators, history)
}
