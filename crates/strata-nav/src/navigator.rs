#![forbid(unsafe_code)]

//! Host-facing entry point.
//!
//! A [`Navigator`] owns one [`OverlayStack`] and one [`HistoryBridge`]. The
//! host creates it once, routes every event into it, and never touches the
//! stack or history directly. All calls are synchronous; time only moves
//! through [`Navigator::tick`].
//!
//! | Host event | Call |
//! |------------|------|
//! | Item clicked | [`open`](Navigator::open) |
//! | Close control / back button in overlay | [`close`](Navigator::close) |
//! | "Home" control | [`close_all`](Navigator::close_all) |
//! | `popstate` | [`pop_state`](Navigator::pop_state) |
//! | Animation frame | [`animation_frame`](Navigator::animation_frame) |
//! | Timer / clock update | [`tick`](Navigator::tick) |
//! | Fetch settled | [`deliver`](Navigator::deliver) |
//! | Error view "retry" | [`retry`](Navigator::retry) |
//! | Touch on the top overlay | [`swipe`](Navigator::swipe) |
//! | Page load | [`boot`](Navigator::boot) |

use core::time::Duration;

use strata_core::{ConfigError, ContentId, FetchTicket, NavConfig, RecordKey};
use tracing::info;

use crate::content::FetchOutcome;
use crate::history::{CloseRoute, HistoryBridge, HistoryState, SessionHistory};
use crate::route::{RouteCodec, RouteError};
use crate::stack::{Collaborators, Delivery, OverlayStack, PushOutcome, ReconcileOutcome};
use crate::swipe::{SwipeOutcome, SwipeTracker, Touch};

/// The navigation engine instance.
#[derive(Debug)]
pub struct Navigator {
    config: NavConfig,
    stack: OverlayStack,
    bridge: HistoryBridge,
    swipe: SwipeTracker,
}

impl Navigator {
    /// Build a navigator. Fails only on invalid configuration.
    pub fn new(
        config: NavConfig,
        collaborators: Collaborators,
        history: Box<dyn SessionHistory>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let stack = OverlayStack::new(&config, collaborators);
        let bridge = HistoryBridge::new(history, RouteCodec::new(config.query_param.clone()));
        let swipe = SwipeTracker::new(config.swipe.clone());
        info!(
            target: "strata.stack",
            settle_delay_ms = config.settle_delay_ms,
            query_param = %config.query_param,
            "navigator ready"
        );
        Ok(Self {
            config,
            stack,
            bridge,
            swipe,
        })
    }

    #[inline]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    #[inline]
    pub fn stack(&self) -> &OverlayStack {
        &self.stack
    }

    #[inline]
    pub fn bridge(&self) -> &HistoryBridge {
        &self.bridge
    }

    /// Open `id` from a user action.
    pub fn open(&mut self, id: impl Into<ContentId>) -> Result<PushOutcome, RouteError> {
        self.bridge.navigate_to(&mut self.stack, id.into())
    }

    /// Close `key` from its own UI.
    pub fn close(&mut self, key: RecordKey) -> CloseRoute {
        self.bridge.close_current_from_ui(&mut self.stack, key)
    }

    /// Close the topmost overlay from its UI.
    pub fn close_top(&mut self) -> CloseRoute {
        match self.stack.top().map(|r| r.key()) {
            Some(key) => self.close(key),
            None => CloseRoute::Ignored,
        }
    }

    /// Close everything and return to the home entry.
    pub fn close_all(&mut self) -> usize {
        self.swipe.reset();
        self.bridge.close_all_to_home(&mut self.stack)
    }

    /// Back/forward traversal. Call after the host location has changed.
    pub fn pop_state(&mut self, state: Option<&HistoryState>) -> Option<ReconcileOutcome> {
        self.swipe.reset();
        self.bridge.on_pop_state(&mut self.stack, state)
    }

    pub fn animation_frame(&mut self) -> usize {
        self.stack.on_animation_frame()
    }

    /// Advance host time to `now`, settling due removals.
    pub fn tick(&mut self, now: Duration) -> usize {
        self.stack.tick(now)
    }

    pub fn deliver(&mut self, ticket: FetchTicket, outcome: FetchOutcome) -> Delivery {
        self.stack.deliver(ticket, outcome)
    }

    pub fn retry(&mut self, key: RecordKey) -> Option<FetchTicket> {
        self.stack.retry(key)
    }

    /// Feed a touch on the top overlay. `Dismiss` has already been applied
    /// (through the same path as the close control) when it is returned.
    pub fn swipe(&mut self, touch: Touch) -> SwipeOutcome {
        if self.stack.top().is_none() {
            self.swipe.reset();
            return SwipeOutcome::None;
        }
        let outcome = self.swipe.process(touch);
        if outcome == SwipeOutcome::Dismiss {
            self.close_top();
        }
        outcome
    }

    /// Initial load; opens a deep-linked overlay if the location names one.
    pub fn boot(&mut self) -> Result<Option<PushOutcome>, RouteError> {
        self.bridge.boot(&mut self.stack)
    }

    /// Drop every overlay immediately and restore the background.
    pub fn reset(&mut self) {
        self.swipe.reset();
        self.stack.reset();
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.stack.is_settled()
    }

    #[inline]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.stack.next_deadline()
    }

    /// Top overlay and location name the same id (or both name none).
    pub fn is_consistent(&self) -> bool {
        match self.bridge.current_id() {
            Ok(url) => self.stack.top().map(|r| r.id()) == url.as_ref(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ContentState;
    use crate::testing::{FakeHistory, Fakes, HistoryLog};
    use std::cell::RefCell;
    use std::rc::Rc;
    use strata_core::{ContentError, Payload};

    const HOME: &str = "https://example.test/news";

    fn navigator() -> (Navigator, Fakes, Rc<RefCell<HistoryLog>>) {
        let (fakes, collaborators) = Fakes::new(250.0);
        let (history, log) = FakeHistory::at(HOME);
        let nav = Navigator::new(NavConfig::default(), collaborators, Box::new(history)).unwrap();
        (nav, fakes, log)
    }

    fn back(nav: &mut Navigator, log: &Rc<RefCell<HistoryLog>>) {
        let state = {
            let log = log.borrow();
            log.entries[log.index.saturating_sub(1)].0.clone()
        };
        {
            let mut log = log.borrow_mut();
            log.index = log.index.saturating_sub(1);
        }
        nav.pop_state(state.as_ref());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let (_fakes, collaborators) = Fakes::new(0.0);
        let (history, _log) = FakeHistory::at(HOME);
        let config = NavConfig::default().with_query_param("");
        assert!(Navigator::new(config, collaborators, Box::new(history)).is_err());
    }

    #[test]
    fn open_close_via_back_round_trip() {
        let (mut nav, fakes, log) = navigator();
        let key = nav.open("a").unwrap().key();
        nav.animation_frame();
        assert!(nav.is_consistent());

        assert_eq!(nav.close(key), CloseRoute::HistoryBack);
        // The host fires popstate after native back.
        assert!(log.borrow_mut().traverse_back());
        nav.pop_state(Some(&HistoryState::home()));
        assert!(nav.is_consistent());
        nav.tick(Duration::from_millis(400));

        assert!(nav.is_settled());
        assert!(nav.stack().is_empty());
        assert_eq!(fakes.background.borrow().jumps, vec![250.0]);
        assert_eq!(log.borrow().index, 0);
    }

    #[test]
    fn nested_opens_then_back_twice() {
        let (mut nav, _fakes, log) = navigator();
        nav.open("a").unwrap();
        nav.open("b").unwrap();
        nav.animation_frame();

        back(&mut nav, &log);
        nav.tick(Duration::from_secs(1));
        assert_eq!(nav.stack().top().unwrap().id().as_str(), "a");
        assert!(nav.is_consistent());

        back(&mut nav, &log);
        nav.tick(Duration::from_secs(2));
        assert!(nav.stack().is_empty());
        assert!(nav.is_consistent());
    }

    #[test]
    fn swipe_dismiss_goes_through_history() {
        let (mut nav, _fakes, log) = navigator();
        nav.open("a").unwrap();
        nav.swipe(Touch::Start { x: 0.0, y: 0.0 });
        nav.swipe(Touch::Move { x: 40.0, y: 0.0 });
        let outcome = nav.swipe(Touch::End {
            x: 200.0,
            viewport_width: 375.0,
        });
        assert_eq!(outcome, SwipeOutcome::Dismiss);
        assert_eq!(log.borrow().backs, 1);
    }

    #[test]
    fn repeated_close_before_popstate_requests_one_back() {
        let (mut nav, _fakes, log) = navigator();
        nav.open("a").unwrap();
        let b = nav.open("b").unwrap().key();
        nav.animation_frame();

        assert_eq!(nav.close_top(), CloseRoute::HistoryBack);
        assert_eq!(nav.close_top(), CloseRoute::Ignored);
        assert_eq!(nav.close(b), CloseRoute::Ignored);
        assert_eq!(nav.bridge().pending_back(), Some(b));
        assert_eq!(log.borrow().backs, 1);

        assert!(log.borrow_mut().traverse_back());
        assert!(!log.borrow_mut().traverse_back());
        nav.pop_state(None);
        nav.tick(Duration::from_secs(1));
        assert_eq!(nav.bridge().pending_back(), None);
        assert_eq!(nav.stack().top().unwrap().id().as_str(), "a");
        assert_eq!(nav.stack().live_len(), 1);
        assert!(nav.is_consistent());

        // The next close is routed through history again.
        assert_eq!(nav.close_top(), CloseRoute::HistoryBack);
        assert_eq!(log.borrow().backs, 2);
    }

    #[test]
    fn empty_id_is_rejected_before_anything_changes() {
        let (mut nav, fakes, log) = navigator();
        nav.open("a").unwrap();
        nav.animation_frame();

        assert!(matches!(nav.open(""), Err(RouteError::EmptyId)));
        nav.animation_frame();
        assert_eq!(log.borrow().pushes, 1);
        assert_eq!(nav.stack().len(), 1);
        assert_eq!(nav.stack().top().unwrap().id().as_str(), "a");
        assert_eq!(fakes.fetches.borrow().len(), 1);
        assert!(nav.is_consistent());
    }

    #[test]
    fn swipe_without_overlay_is_ignored() {
        let (mut nav, _fakes, _log) = navigator();
        assert_eq!(nav.swipe(Touch::Start { x: 0.0, y: 0.0 }), SwipeOutcome::None);
        assert_eq!(nav.swipe(Touch::Move { x: 100.0, y: 0.0 }), SwipeOutcome::None);
    }

    #[test]
    fn failed_content_retry_then_ready() {
        let (mut nav, fakes, _log) = navigator();
        let key = nav.open("a").unwrap().key();
        nav.deliver(fakes.last_ticket(), Err(ContentError::NotFound));
        let ticket = nav.retry(key).unwrap();
        assert_eq!(nav.deliver(ticket, Ok(Payload::new("body"))), Delivery::Ready(key));
        assert_eq!(
            nav.stack().get(key).unwrap().content(),
            &ContentState::Ready(Payload::new("body"))
        );
    }

    #[test]
    fn close_all_collapses_to_home_entry() {
        let (mut nav, fakes, log) = navigator();
        nav.open("a").unwrap();
        nav.open("b").unwrap();
        nav.open("c").unwrap();
        assert_eq!(nav.close_all(), 3);
        nav.tick(Duration::from_millis(400));

        assert!(nav.stack().is_empty());
        assert!(nav.is_consistent());
        assert_eq!(log.borrow().entries[log.borrow().index].1, HOME);
        assert_eq!(fakes.background.borrow().jumps.len(), 1);
    }

    #[test]
    fn reset_leaves_clean_instance() {
        let (mut nav, fakes, _log) = navigator();
        nav.open("a").unwrap();
        nav.reset();
        assert!(nav.is_settled());
        assert!(nav.stack().is_empty());
        assert!(!fakes.background.borrow().hidden);
    }
}
