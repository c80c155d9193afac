#![forbid(unsafe_code)]

//! Simulated browser session history.
//!
//! Models the parts of the History API the engine relies on:
//!
//! - `push_state` truncates forward entries and moves the cursor.
//! - `replace_state` rewrites the current entry in place.
//! - The back and forward buttons move the cursor and queue a popstate
//!   carrying the destination entry's payload.
//! - A scripted `history.back()` only queues the traversal. The location is
//!   unchanged until the traversal is applied on delivery.
//!
//! Popstate is delivered asynchronously: the scenario driver pops it from
//! [`SimulatedBrowser::take_pop_state`] and hands it to the navigator, just
//! as a browser fires it on a later task.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use strata_nav::{HistoryState, SessionHistory};

/// One session-history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub url: String,
    pub state: Option<HistoryState>,
}

/// History API call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCalls {
    pub pushes: u32,
    pub replaces: u32,
    pub backs: u32,
    pub forwards: u32,
}

#[derive(Debug)]
enum Pending {
    /// Cursor already moved; fire popstate with this payload.
    Popped(Option<HistoryState>),
    /// Scripted back not yet applied.
    Back,
}

#[derive(Debug)]
struct State {
    entries: Vec<Entry>,
    index: usize,
    pending: VecDeque<Pending>,
    calls: HistoryCalls,
}

/// Shared handle to the simulated tab.
#[derive(Debug, Clone)]
pub struct SimulatedBrowser(Rc<RefCell<State>>);

impl SimulatedBrowser {
    /// A tab that has loaded `url` with no state payload.
    #[must_use]
    pub fn at(url: &str) -> Self {
        Self(Rc::new(RefCell::new(State {
            entries: vec![Entry {
                url: url.to_owned(),
                state: None,
            }],
            index: 0,
            pending: VecDeque::new(),
            calls: HistoryCalls::default(),
        })))
    }

    /// Session-history collaborator bound to this tab.
    #[must_use]
    pub fn history(&self) -> Box<dyn SessionHistory> {
        Box::new(self.clone())
    }

    /// Browser back button. Returns `false` at the first entry.
    pub fn go_back(&self) -> bool {
        let mut state = self.0.borrow_mut();
        if state.index == 0 {
            return false;
        }
        state.index -= 1;
        let popped = state.entries[state.index].state.clone();
        state.pending.push_back(Pending::Popped(popped));
        true
    }

    /// Browser forward button. Returns `false` at the last entry.
    pub fn go_forward(&self) -> bool {
        let mut state = self.0.borrow_mut();
        if state.index + 1 >= state.entries.len() {
            return false;
        }
        state.index += 1;
        state.calls.forwards += 1;
        let popped = state.entries[state.index].state.clone();
        state.pending.push_back(Pending::Popped(popped));
        true
    }

    /// Next undelivered popstate payload, if any. A queued scripted back is
    /// applied to the cursor here; at the first entry it is dropped.
    ///
    /// The outer `Option` is whether a popstate is pending; the inner one is
    /// the entry's payload, absent for entries created outside the engine.
    pub fn take_pop_state(&self) -> Option<Option<HistoryState>> {
        let mut state = self.0.borrow_mut();
        while let Some(pending) = state.pending.pop_front() {
            match pending {
                Pending::Popped(payload) => return Some(payload),
                Pending::Back if state.index > 0 => {
                    state.index -= 1;
                    return Some(state.entries[state.index].state.clone());
                }
                Pending::Back => {}
            }
        }
        None
    }

    pub fn has_pending_pop_state(&self) -> bool {
        !self.0.borrow().pending.is_empty()
    }

    pub fn url(&self) -> String {
        let state = self.0.borrow();
        state.entries[state.index].url.clone()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().entries.clone()
    }

    pub fn index(&self) -> usize {
        self.0.borrow().index
    }

    pub fn calls(&self) -> HistoryCalls {
        self.0.borrow().calls
    }

    /// Overwrite the URL of entry `index` (e.g. a forward entry edited by
    /// another script). Test-only manipulation; the engine is not notified.
    pub fn rewrite_entry(&self, index: usize, url: &str) {
        if let Some(entry) = self.0.borrow_mut().entries.get_mut(index) {
            entry.url = url.to_owned();
            entry.state = None;
        }
    }
}

impl SessionHistory for SimulatedBrowser {
    fn location(&self) -> String {
        self.url()
    }

    fn state(&self) -> Option<HistoryState> {
        let state = self.0.borrow();
        state.entries[state.index].state.clone()
    }

    fn push_state(&mut self, payload: &HistoryState, url: &str) {
        let mut state = self.0.borrow_mut();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(Entry {
            url: url.to_owned(),
            state: Some(payload.clone()),
        });
        state.index += 1;
        state.calls.pushes += 1;
    }

    fn replace_state(&mut self, payload: &HistoryState, url: &str) {
        let mut state = self.0.borrow_mut();
        let index = state.index;
        state.entries[index] = Entry {
            url: url.to_owned(),
            state: Some(payload.clone()),
        };
        state.calls.replaces += 1;
    }

    fn back(&mut self) {
        let mut state = self.0.borrow_mut();
        state.calls.backs += 1;
        state.pending.push_back(Pending::Back);
    }
}
