#![forbid(unsafe_code)]

//! Scenario driver.
//!
//! A [`Scenario`] wires one [`Navigator`] to a [`SimulatedBrowser`], a
//! [`RecordingSurface`], [`ScriptedContent`] and a [`DeterministicClock`],
//! and exposes user-level operations (open, back, forward, close) as
//! [`Step`]s. Popstate events queued by the browser are delivered before a
//! step returns, so after every step the engine has seen everything the
//! browser did.
//!
//! Every applied step appends one JSON line to the transcript, recording the
//! location and the live ids afterwards. Failing property tests print it.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use strata_core::{Clock, ConfigError, ContentId, DeterministicClock, NavConfig, RecordKey};
use strata_nav::{
    CloseRoute, Collaborators, Delivery, Navigator, PushOutcome, RouteError, SwipeOutcome, Touch,
};
use tracing::debug;

use crate::browser::SimulatedBrowser;
use crate::content::{ArticleRenderer, ScriptedContent};
use crate::surface::RecordingSurface;

const TARGET: &str = "strata.harness";

/// One user-level operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Open { id: String },
    CloseTop,
    CloseAll,
    Back,
    Forward,
    Frame,
    Advance { ms: u64 },
    ResolveFetches,
    Retry,
    SwipeDismiss,
    Scroll { offset: f64 },
    Settle,
    Reset,
}

#[derive(Debug, Serialize)]
struct TranscriptLine<'a> {
    seq: usize,
    step: &'a Step,
    url: String,
    live: Vec<String>,
    closing: usize,
    settled: bool,
}

/// Navigator plus simulated browser, document and content.
#[derive(Debug)]
pub struct Scenario {
    nav: Navigator,
    browser: SimulatedBrowser,
    surface: RecordingSurface,
    content: ScriptedContent,
    clock: DeterministicClock,
    transcript: Vec<String>,
}

impl Scenario {
    /// Default configuration, tab loaded at `home`.
    pub fn new(home: &str) -> Self {
        match Self::with_config(NavConfig::default(), home) {
            Ok(scenario) => scenario,
            Err(error) => unreachable!("default config is valid: {error}"),
        }
    }

    pub fn with_config(config: NavConfig, home: &str) -> Result<Self, ConfigError> {
        let browser = SimulatedBrowser::at(home);
        let surface = RecordingSurface::new();
        let content = ScriptedContent::new();
        let collaborators = Collaborators {
            nodes: Box::new(surface.clone()),
            provider: Box::new(content.clone()),
            renderer: Box::new(ArticleRenderer),
            background: Box::new(surface.clone()),
        };
        let nav = Navigator::new(config, collaborators, browser.history())?;
        Ok(Self {
            nav,
            browser,
            surface,
            content,
            clock: DeterministicClock::new(),
            transcript: Vec::new(),
        })
    }

    #[inline]
    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    #[inline]
    pub fn browser(&self) -> &SimulatedBrowser {
        &self.browser
    }

    #[inline]
    pub fn surface(&self) -> &RecordingSurface {
        &self.surface
    }

    #[inline]
    pub fn content(&self) -> &ScriptedContent {
        &self.content
    }

    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    // ── Operations ──────────────────────────────────────────────────────

    pub fn boot(&mut self) -> Result<Option<PushOutcome>, RouteError> {
        self.nav.boot()
    }

    pub fn open(&mut self, id: &str) -> Result<PushOutcome, RouteError> {
        self.nav.open(id)
    }

    /// Close control on the top overlay.
    pub fn close_top(&mut self) -> CloseRoute {
        let route = self.nav.close_top();
        self.deliver_pop_states();
        route
    }

    /// Close control on a specific overlay.
    pub fn close(&mut self, key: RecordKey) -> CloseRoute {
        let route = self.nav.close(key);
        self.deliver_pop_states();
        route
    }

    pub fn close_all(&mut self) -> usize {
        self.nav.close_all()
    }

    /// Browser back button. Returns `false` at the first entry.
    pub fn back(&mut self) -> bool {
        let moved = self.browser.go_back();
        self.deliver_pop_states();
        moved
    }

    /// Browser forward button. Returns `false` at the last entry.
    pub fn forward(&mut self) -> bool {
        let moved = self.browser.go_forward();
        self.deliver_pop_states();
        moved
    }

    pub fn frame(&mut self) -> usize {
        self.nav.animation_frame()
    }

    /// Move the clock forward and settle due removals.
    pub fn advance(&mut self, ms: u64) -> usize {
        self.clock.advance(Duration::from_millis(ms));
        self.nav.tick(self.clock.now_mono())
    }

    /// Answer every pending fetch according to its script.
    pub fn resolve_fetches(&mut self) -> Vec<Delivery> {
        self.content
            .resolve_all()
            .into_iter()
            .map(|(ticket, outcome)| self.nav.deliver(ticket, outcome))
            .collect()
    }

    /// Retry on the top overlay's error view.
    pub fn retry_top(&mut self) -> bool {
        let Some(key) = self.nav.stack().top().map(|r| r.key()) else {
            return false;
        };
        self.nav.retry(key).is_some()
    }

    /// Rightward swipe across most of a 400 px viewport.
    pub fn swipe_dismiss(&mut self) -> SwipeOutcome {
        self.nav.swipe(Touch::Start { x: 10.0, y: 200.0 });
        self.nav.swipe(Touch::Move { x: 60.0, y: 204.0 });
        let outcome = self.nav.swipe(Touch::End {
            x: 300.0,
            viewport_width: 400.0,
        });
        self.deliver_pop_states();
        outcome
    }

    /// Run frames and timers until nothing is in flight.
    pub fn settle(&mut self) -> usize {
        self.frame();
        let mut settled = 0;
        while let Some(deadline) = self.nav.next_deadline() {
            self.clock.set(deadline);
            settled += self.nav.tick(self.clock.now_mono());
        }
        settled
    }

    pub fn reset(&mut self) {
        self.nav.reset();
        self.content.forget_pending();
    }

    fn deliver_pop_states(&mut self) {
        while let Some(state) = self.browser.take_pop_state() {
            self.nav.pop_state(state.as_ref());
        }
    }

    /// Apply a step and append it to the transcript.
    pub fn apply(&mut self, step: Step) {
        debug!(target: TARGET, ?step, "step");
        match &step {
            Step::Open { id } => {
                if let Err(error) = self.open(id) {
                    debug!(target: TARGET, %error, "open rejected");
                }
            }
            Step::CloseTop => {
                self.close_top();
            }
            Step::CloseAll => {
                self.close_all();
            }
            Step::Back => {
                self.back();
            }
            Step::Forward => {
                self.forward();
            }
            Step::Frame => {
                self.frame();
            }
            Step::Advance { ms } => {
                self.advance(*ms);
            }
            Step::ResolveFetches => {
                self.resolve_fetches();
            }
            Step::Retry => {
                self.retry_top();
            }
            Step::SwipeDismiss => {
                self.swipe_dismiss();
            }
            Step::Scroll { offset } => self.surface.scroll_background_to(*offset),
            Step::Settle => {
                self.settle();
            }
            Step::Reset => self.reset(),
        }
        self.record(&step);
    }

    fn record(&mut self, step: &Step) {
        let line = TranscriptLine {
            seq: self.transcript.len(),
            step,
            url: self.browser.url(),
            live: self.live_ids(),
            closing: self.nav.stack().closing_in_flight(),
            settled: self.nav.is_settled(),
        };
        match serde_json::to_string(&line) {
            Ok(json) => self.transcript.push(json),
            Err(error) => debug!(target: TARGET, %error, "transcript line dropped"),
        }
    }

    /// Transcript as JSON lines.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn transcript_jsonl(&self) -> String {
        let mut out = self.transcript.join("\n");
        out.push('\n');
        out
    }

    // ── Observations ────────────────────────────────────────────────────

    pub fn top_id(&self) -> Option<String> {
        self.nav.stack().top().map(|r| r.id().as_str().to_owned())
    }

    /// Id named by the browser's current location.
    pub fn url_id(&self) -> Option<String> {
        self.nav
            .bridge()
            .current_id()
            .ok()
            .flatten()
            .map(ContentId::into_string)
    }

    /// Live ids, bottom to top.
    pub fn live_ids(&self) -> Vec<String> {
        self.nav
            .stack()
            .live()
            .map(|r| r.id().as_str().to_owned())
            .collect()
    }

    /// Check the settled invariant and the document's agreement with it.
    ///
    /// Only meaningful once [`Navigator::is_settled`] holds.
    pub fn check_settled(&self) -> Result<(), String> {
        if !self.nav.is_settled() {
            return Err("transitions still in flight".into());
        }
        if self.top_id() != self.url_id() {
            return Err(format!(
                "top {:?} disagrees with location {:?}",
                self.top_id(),
                self.browser.url()
            ));
        }
        let visible = self.surface.visible_ids();
        if visible != self.live_ids() {
            return Err(format!(
                "document shows {visible:?}, stack has {:?}",
                self.live_ids()
            ));
        }
        if self.surface.attached().len() != self.nav.stack().len() {
            return Err("detached record still in stack or orphan node attached".into());
        }
        let hidden = self.surface.background().hidden;
        if hidden == self.live_ids().is_empty() {
            return Err(format!("background hidden={hidden} with live {:?}", self.live_ids()));
        }
        let violations = self.surface.violations();
        if !violations.is_empty() {
            return Err(violations.join("; "));
        }
        Ok(())
    }
}
