#![forbid(unsafe_code)]

//! Session-history bridge.
//!
//! [`HistoryBridge`] is the only code that touches session history. User
//! opens become pushed entries; back/forward notifications become
//! [`OverlayStack::reconcile`] calls driven by the *current* location.
//!
//! # Invariants
//!
//! 1. History is mutated before the stack, so a settled stack always agrees
//!    with the location.
//! 2. `on_pop_state` never pushes or replaces history; it only reacts.
//! 3. The state payload is diagnostic. Truth comes from the location, which
//!    is read from the history collaborator on every call, never cached.
//! 4. At most one requested native back is outstanding. Until its popstate
//!    arrives the location is unchanged, so a UI close that would request
//!    another back is ignored.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Unparsable location on popstate | `warn!`, stack unchanged |
//! | Payload disagrees with location | `debug!`, location wins |
//! | Unparsable location on close-all | Overlays close, entry not replaced |

use serde::{Deserialize, Serialize};
use strata_core::{ContentId, RecordKey};
use tracing::{debug, info, warn};

use crate::route::{RouteCodec, RouteError};
use crate::stack::{OverlayStack, PushOutcome, ReconcileOutcome};

const TARGET: &str = "strata.history";

/// Payload attached to entries this bridge creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    pub has_overlay: bool,
    pub id: Option<ContentId>,
}

impl HistoryState {
    /// Entry with no overlay open.
    #[must_use]
    pub const fn home() -> Self {
        Self {
            has_overlay: false,
            id: None,
        }
    }

    /// Entry whose top overlay is `id`.
    #[must_use]
    pub fn overlay(id: ContentId) -> Self {
        Self {
            has_overlay: true,
            id: Some(id),
        }
    }
}

/// The host's per-tab navigation stack.
pub trait SessionHistory {
    /// Current absolute location, after any navigation already performed.
    fn location(&self) -> String;

    /// Payload of the current entry, if it carries one.
    fn state(&self) -> Option<HistoryState>;

    fn push_state(&mut self, state: &HistoryState, url: &str);

    fn replace_state(&mut self, state: &HistoryState, url: &str);

    /// Native back navigation. The host reports the resulting popstate
    /// later through [`HistoryBridge::on_pop_state`].
    fn back(&mut self);
}

/// How a UI close request was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRoute {
    /// The record is the one in the URL; native back was requested.
    HistoryBack,
    /// Stale UI action; closed directly (count of records closed).
    Direct(usize),
    /// Record is not live; nothing to do.
    Ignored,
}

/// Translates between session history and the overlay stack.
pub struct HistoryBridge {
    history: Box<dyn SessionHistory>,
    codec: RouteCodec,
    /// Record whose close is waiting on the popstate of a requested back.
    pending_back: Option<RecordKey>,
}

impl std::fmt::Debug for HistoryBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryBridge")
            .field("codec", &self.codec)
            .field("pending_back", &self.pending_back)
            .finish_non_exhaustive()
    }
}

impl HistoryBridge {
    #[must_use]
    pub fn new(history: Box<dyn SessionHistory>, codec: RouteCodec) -> Self {
        Self {
            history,
            codec,
            pending_back: None,
        }
    }

    #[inline]
    pub fn codec(&self) -> &RouteCodec {
        &self.codec
    }

    /// Record closed through native back whose popstate has not arrived.
    #[inline]
    pub fn pending_back(&self) -> Option<RecordKey> {
        self.pending_back
    }

    /// Current location as reported by the host.
    pub fn location(&self) -> String {
        self.history.location()
    }

    /// Content id in the current location.
    pub fn current_id(&self) -> Result<Option<ContentId>, RouteError> {
        self.codec.id_of(&self.history.location())
    }

    /// Open `id` as a new history step.
    ///
    /// When the location already names `id` and it is the top overlay, no
    /// entry is pushed. An empty id cannot be carried in the location and is
    /// rejected before history or the stack change.
    pub fn navigate_to(
        &mut self,
        stack: &mut OverlayStack,
        id: ContentId,
    ) -> Result<PushOutcome, RouteError> {
        if id.as_str().is_empty() {
            return Err(RouteError::EmptyId);
        }
        let location = self.history.location();
        let current = self.codec.id_of(&location)?;
        let on_top = stack.top().is_some_and(|r| *r.id() == id);
        if on_top && current.as_ref() == Some(&id) {
            debug!(target: TARGET, id = %id, "already current, no entry pushed");
            return Ok(stack.push(id));
        }

        let url = self.codec.with_id(&location, &id)?;
        self.history
            .push_state(&HistoryState::overlay(id.clone()), &url);
        debug!(target: TARGET, id = %id, url = %url, "pushed entry");
        Ok(stack.push(id))
    }

    /// Close a record from its own close control or a swipe.
    ///
    /// The decision compares content ids, not record identity: with
    /// `[a, b, a]` live and the location naming `a`, closing the bottom `a`
    /// still goes back one entry, which closes the top `a`.
    pub fn close_current_from_ui(&mut self, stack: &mut OverlayStack, key: RecordKey) -> CloseRoute {
        let Some(record) = stack.get(key).filter(|r| r.is_live()) else {
            return CloseRoute::Ignored;
        };
        let current = match self.current_id() {
            Ok(current) => current,
            Err(error) => {
                warn!(target: TARGET, %error, "location unreadable, closing directly");
                None
            }
        };
        if current.as_ref() == Some(record.id()) {
            if let Some(pending) = self.pending_back {
                debug!(target: TARGET, key = %key, %pending, "back already requested");
                return CloseRoute::Ignored;
            }
            debug!(target: TARGET, key = %key, "close via history back");
            self.history.back();
            self.pending_back = Some(key);
            return CloseRoute::HistoryBack;
        }
        let closed = stack.close(key);
        debug!(target: TARGET, key = %key, closed, "stale close, history untouched");
        CloseRoute::Direct(closed)
    }

    /// Close every overlay and collapse the current entry to the bare URL.
    pub fn close_all_to_home(&mut self, stack: &mut OverlayStack) -> usize {
        let closed = stack.close_all();
        let location = self.history.location();
        match self.codec.without_id(&location) {
            Ok(url) => {
                self.history.replace_state(&HistoryState::home(), &url);
                info!(target: TARGET, closed, url = %url, "home");
            }
            Err(error) => {
                warn!(target: TARGET, %error, closed, "location unreadable, entry not replaced");
            }
        }
        closed
    }

    /// React to a back/forward traversal.
    ///
    /// `state` is the popped entry's payload, used only for diagnostics; when
    /// the host does not forward it, the current entry's payload is read.
    pub fn on_pop_state(
        &mut self,
        stack: &mut OverlayStack,
        state: Option<&HistoryState>,
    ) -> Option<ReconcileOutcome> {
        self.pending_back = None;
        let location = self.history.location();
        let target = match self.codec.id_of(&location) {
            Ok(target) => target,
            Err(error) => {
                warn!(target: TARGET, %error, location = %location, "popstate ignored");
                return None;
            }
        };
        let payload = state.cloned().or_else(|| self.history.state());
        if let Some(state) = payload
            && state.id != target
        {
            debug!(
                target: TARGET,
                payload = ?state.id,
                location = ?target,
                "state payload disagrees with location"
            );
        }
        let outcome = stack.reconcile(target.as_ref());
        debug!(target: TARGET, ?outcome, "popstate");
        Some(outcome)
    }

    /// Initial load: open the overlay named by the location, if any.
    ///
    /// The entry already exists, so nothing is pushed; its payload is
    /// replaced so later traversals carry diagnostics.
    pub fn boot(&mut self, stack: &mut OverlayStack) -> Result<Option<PushOutcome>, RouteError> {
        let location = self.history.location();
        let Some(id) = self.codec.id_of(&location)? else {
            return Ok(None);
        };
        self.history
            .replace_state(&HistoryState::overlay(id.clone()), &location);
        info!(target: TARGET, id = %id, "deep link");
        Ok(Some(stack.push(id)))
    }
}
