#![forbid(unsafe_code)]

//! `strata-web` adapts the navigation engine to a browser page.
//!
//! Design goals:
//! - **Host-driven I/O**: the page pushes JSON events (clicks, popstate,
//!   frames, fetch results) and drains JSON commands.
//! - **Deterministic time**: timestamps arrive with frame and tick events;
//!   the engine never reads a clock of its own.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate does not bind to `wasm-bindgen`. A thin JS shim calls
//! [`WebNavigator::handle_json`] from its listeners and applies the output
//! of [`WebNavigator::drain_commands_json`] after each call.

pub mod command;
pub mod event;
pub mod host;

use std::cell::RefCell;
use std::rc::Rc;

use strata_core::{ConfigError, NavConfig, Payload};
use strata_nav::{Navigator, RouteError, SwipeOutcome};
use thiserror::Error;
use tracing::{trace, warn};

pub use command::{BodyView, CommandQueue, HostCommand};
pub use event::{HostEvent, HostEventError, parse_host_event};
pub use host::{MarkupRenderer, PageState, SharedPage};

const TARGET: &str = "strata.web";

/// Failure handling one host event.
#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Event(#[from] HostEventError),
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Navigator wired to a page through the command queue.
#[derive(Debug)]
pub struct WebNavigator {
    nav: Navigator,
    page: SharedPage,
    commands: CommandQueue,
}

impl WebNavigator {
    /// Create an engine for a page currently at `location`.
    pub fn new(config: NavConfig, location: impl Into<String>) -> Result<Self, ConfigError> {
        let page: SharedPage = Rc::new(RefCell::new(PageState {
            location: location.into(),
            ..PageState::default()
        }));
        let commands = CommandQueue::new();
        let (collaborators, history) = host::host_collaborators(&page, &commands);
        let nav = Navigator::new(config, collaborators, history)?;
        Ok(Self {
            nav,
            page,
            commands,
        })
    }

    #[inline]
    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    /// Page facts as last reported or written.
    pub fn page(&self) -> PageState {
        self.page.borrow().clone()
    }

    /// Decode and apply one JSON event.
    pub fn handle_json(&mut self, json: &str) -> Result<(), WebError> {
        let event = match parse_host_event(json) {
            Ok(event) => event,
            Err(error) => {
                warn!(target: TARGET, %error, "host event rejected");
                return Err(error.into());
            }
        };
        self.handle(event)
    }

    /// Apply one decoded event.
    pub fn handle(&mut self, event: HostEvent) -> Result<(), WebError> {
        trace!(target: TARGET, ?event, "host event");
        match event {
            HostEvent::Boot {
                location,
                scroll_offset,
            } => {
                {
                    let mut page = self.page.borrow_mut();
                    page.location = location;
                    page.scroll_offset = scroll_offset;
                }
                self.nav.boot()?;
            }
            HostEvent::Open { id } => {
                self.nav.open(id)?;
            }
            HostEvent::Close { record } => {
                self.nav.close(record);
            }
            HostEvent::CloseTop => {
                self.nav.close_top();
            }
            HostEvent::CloseAll => {
                self.nav.close_all();
            }
            HostEvent::PopState { location, state } => {
                {
                    let mut page = self.page.borrow_mut();
                    page.location = location;
                    page.state = state.clone();
                }
                self.nav.pop_state(state.as_ref());
            }
            HostEvent::AnimationFrame { now_ms } => {
                self.nav.tick(event::millis(now_ms)?);
                self.nav.animation_frame();
            }
            HostEvent::Tick { now_ms } => {
                self.nav.tick(event::millis(now_ms)?);
            }
            HostEvent::Scroll { offset } => {
                self.page.borrow_mut().scroll_offset = offset;
            }
            HostEvent::FetchOk {
                record,
                attempt,
                body,
            } => {
                self.nav
                    .deliver(event::ticket(record, attempt), Ok(Payload::new(body)));
            }
            HostEvent::FetchErr {
                record,
                attempt,
                error,
                message,
            } => {
                let error = event::fetch_error(error, message.as_deref());
                self.nav.deliver(event::ticket(record, attempt), Err(error));
            }
            HostEvent::Retry { record } => {
                self.nav.retry(record);
            }
            ref touch @ HostEvent::Touch { .. } => {
                if let Some(touch) = event::touch_of(touch)? {
                    match self.nav.swipe(touch) {
                        SwipeOutcome::Follow(dx) => self.commands.push(HostCommand::FollowSwipe { dx }),
                        SwipeOutcome::SnapBack => self.commands.push(HostCommand::SnapBack),
                        SwipeOutcome::Dismiss | SwipeOutcome::None => {}
                    }
                }
            }
            HostEvent::Reset => self.nav.reset(),
        }
        Ok(())
    }

    /// Take pending commands, oldest first.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        self.commands.drain()
    }

    /// Take pending commands as a JSON array.
    pub fn drain_commands_json(&mut self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.commands.drain())
    }
}
