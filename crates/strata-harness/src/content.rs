#![forbid(unsafe_code)]

//! Scripted content provider and renderer.
//!
//! Requests are queued, not answered, so tests control exactly when each
//! fetch completes relative to navigation. Per-id scripts decide the outcome.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use strata_core::{ContentError, ContentId, FetchTicket, Fragment, Payload};
use strata_nav::{ContentProvider, ContentRenderer, FetchOutcome};

/// How requests for an id resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Payload `"body of <id>"`.
    Body,
    /// Always `NotFound`.
    Missing,
    /// `Network` error for the first `n` attempts, then `Body`.
    FlakyFor(u32),
    /// A payload the renderer rejects.
    Malformed,
}

/// A request the engine issued and nobody has answered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub ticket: FetchTicket,
    pub id: ContentId,
}

#[derive(Debug, Default)]
struct State {
    scripts: HashMap<ContentId, Script>,
    pending: VecDeque<PendingFetch>,
    requested: u32,
}

/// Shared handle to the scripted provider.
#[derive(Debug, Clone, Default)]
pub struct ScriptedContent(Rc<RefCell<State>>);

impl ScriptedContent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, id: impl Into<ContentId>, script: Script) -> &Self {
        self.0.borrow_mut().scripts.insert(id.into(), script);
        self
    }

    /// Total requests issued so far.
    pub fn requested(&self) -> u32 {
        self.0.borrow().requested
    }

    pub fn pending(&self) -> Vec<PendingFetch> {
        self.0.borrow().pending.iter().cloned().collect()
    }

    /// Remove and resolve the oldest pending request.
    pub fn resolve_next(&self) -> Option<(FetchTicket, FetchOutcome)> {
        let mut state = self.0.borrow_mut();
        let fetch = state.pending.pop_front()?;
        let script = state
            .scripts
            .get(&fetch.id)
            .cloned()
            .unwrap_or(Script::Body);
        let outcome = match script {
            Script::Body => Ok(body_for(&fetch.id)),
            Script::Missing => Err(ContentError::NotFound),
            Script::FlakyFor(n) if fetch.ticket.attempt < n => {
                Err(ContentError::Network("connection reset".into()))
            }
            Script::FlakyFor(_) => Ok(body_for(&fetch.id)),
            Script::Malformed => Ok(Payload::new(MALFORMED)),
        };
        Some((fetch.ticket, outcome))
    }

    /// Resolve every pending request in issue order.
    pub fn resolve_all(&self) -> Vec<(FetchTicket, FetchOutcome)> {
        std::iter::from_fn(|| self.resolve_next()).collect()
    }

    /// Drop pending requests without answering them.
    pub fn forget_pending(&self) -> usize {
        let mut state = self.0.borrow_mut();
        let n = state.pending.len();
        state.pending.clear();
        n
    }
}

const MALFORMED: &str = "\u{0}";

fn body_for(id: &ContentId) -> Payload {
    Payload::new(format!("body of {id}"))
}

impl ContentProvider for ScriptedContent {
    fn request(&mut self, ticket: FetchTicket, id: &ContentId) {
        let mut state = self.0.borrow_mut();
        state.requested += 1;
        state.pending.push_back(PendingFetch {
            ticket,
            id: id.clone(),
        });
    }
}

/// Wraps payloads in an `<article>`; rejects the scripted malformed body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleRenderer;

impl ContentRenderer for ArticleRenderer {
    fn render(&self, payload: &Payload) -> Result<Fragment, ContentError> {
        if payload.body() == MALFORMED {
            return Err(ContentError::Render("unexpected NUL payload".into()));
        }
        Ok(Fragment::new(format!("<article>{}</article>", payload.body())))
    }

    fn error_view(&self, error: &ContentError) -> Fragment {
        Fragment::new(format!(
            "<div class=\"error\" data-kind=\"{}\"><button>retry</button><button>close</button></div>",
            error.kind()
        ))
    }
}
