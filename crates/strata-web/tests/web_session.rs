//! Drives `WebNavigator` the way a JS shim would: send an event, apply the
//! drained commands to a toy page model, answer fetches, repeat.

use std::collections::BTreeMap;

use strata_core::{NavConfig, RecordKey};
use strata_web::{BodyView, HostCommand, WebNavigator};

const HOME: &str = "https://news.example/list?page=1";

#[derive(Debug, Default)]
struct Page {
    entries: Vec<String>,
    index: usize,
    nodes: BTreeMap<u64, (String, bool, String)>,
    background_hidden: bool,
    scroll: f64,
    pending_fetches: Vec<(u64, u32, String)>,
    queued_backs: usize,
    backs_requested: usize,
}

impl Page {
    fn new() -> Self {
        Self {
            entries: vec![HOME.to_owned()],
            ..Self::default()
        }
    }

    fn apply(&mut self, commands: Vec<HostCommand>) {
        for command in commands {
            match command {
                HostCommand::AttachNode { record, id } => {
                    self.nodes
                        .insert(record.raw(), (id.into_string(), false, String::new()));
                }
                HostCommand::SetActive { record, active } => {
                    self.nodes.get_mut(&record.raw()).unwrap().1 = active;
                }
                HostCommand::Present { record, body } => {
                    let text = match body {
                        BodyView::Loading => "loading".to_owned(),
                        BodyView::Ready { html } => html,
                        BodyView::Failed { error, .. } => format!("error:{error}"),
                    };
                    self.nodes.get_mut(&record.raw()).unwrap().2 = text;
                }
                HostCommand::DetachNode { record } => {
                    self.nodes.remove(&record.raw());
                }
                HostCommand::HideBackground { hidden } => self.background_hidden = hidden,
                HostCommand::ScrollTo { offset } => self.scroll = offset,
                HostCommand::Fetch {
                    record,
                    attempt,
                    id,
                } => self
                    .pending_fetches
                    .push((record.raw(), attempt, id.into_string())),
                HostCommand::PushState { url, .. } => {
                    self.entries.truncate(self.index + 1);
                    self.entries.push(url);
                    self.index += 1;
                }
                HostCommand::ReplaceState { url, .. } => self.entries[self.index] = url,
                HostCommand::HistoryBack => {
                    self.queued_backs += 1;
                    self.backs_requested += 1;
                }
                HostCommand::FollowSwipe { .. } | HostCommand::SnapBack => {}
            }
        }
    }

    fn location(&self) -> &str {
        &self.entries[self.index]
    }
}

struct Session {
    web: WebNavigator,
    page: Page,
    now_ms: f64,
    /// Leave requested backs queued instead of traversing right away.
    hold_traversals: bool,
}

impl Session {
    fn new() -> Self {
        let mut session = Self {
            web: WebNavigator::new(NavConfig::default(), HOME).unwrap(),
            page: Page::new(),
            now_ms: 0.0,
            hold_traversals: false,
        };
        session.send(&format!(r#"{{"kind":"boot","location":"{HOME}","scroll_offset":0}}"#));
        session
    }

    fn send(&mut self, json: &str) {
        self.web.handle_json(json).unwrap();
        let commands = self.web.drain_commands();
        self.page.apply(commands);
        if !self.hold_traversals {
            self.run_traversals();
        }
    }

    /// Apply every queued back, one popstate each.
    fn run_traversals(&mut self) {
        while self.page.queued_backs > 0 {
            self.page.queued_backs -= 1;
            self.back();
        }
    }

    fn scroll_to(&mut self, offset: f64) {
        self.page.scroll = offset;
        self.send(&format!(r#"{{"kind":"scroll","offset":{offset}}}"#));
    }

    fn frame(&mut self) {
        self.now_ms += 16.0;
        self.send(&format!(r#"{{"kind":"animation_frame","now_ms":{}}}"#, self.now_ms));
    }

    fn wait(&mut self, ms: f64) {
        self.now_ms += ms;
        self.send(&format!(r#"{{"kind":"tick","now_ms":{}}}"#, self.now_ms));
    }

    fn answer_fetches(&mut self) {
        for (record, attempt, id) in std::mem::take(&mut self.page.pending_fetches) {
            self.send(&format!(
                r#"{{"kind":"fetch_ok","record":{record},"attempt":{attempt},"body":"<h1>{id}</h1>"}}"#
            ));
        }
    }

    fn back(&mut self) {
        self.page.index -= 1;
        let location = self.page.location().to_owned();
        self.send(&format!(r#"{{"kind":"pop_state","location":"{location}"}}"#));
    }

    fn visible(&self) -> Vec<(&str, &str)> {
        self.page
            .nodes
            .values()
            .filter(|(_, active, _)| *active)
            .map(|(id, _, body)| (id.as_str(), body.as_str()))
            .collect()
    }
}

#[test]
fn browse_nested_and_return_home() {
    let mut s = Session::new();
    s.scroll_to(1_200.0);

    s.send(r#"{"kind":"open","id":"a"}"#);
    s.frame();
    s.answer_fetches();
    s.send(r#"{"kind":"open","id":"b"}"#);
    s.frame();
    s.answer_fetches();

    assert!(s.page.background_hidden);
    assert_eq!(s.page.location(), "https://news.example/list?page=1&id=b");
    assert_eq!(s.visible(), vec![("a", "<h1>a</h1>"), ("b", "<h1>b</h1>")]);

    s.send(r#"{"kind":"close_top"}"#);
    s.wait(400.0);
    assert_eq!(s.page.location(), "https://news.example/list?page=1&id=a");
    assert_eq!(s.visible(), vec![("a", "<h1>a</h1>")]);
    assert_eq!(s.page.nodes.len(), 1);

    s.back();
    s.wait(400.0);
    assert_eq!(s.page.location(), HOME);
    assert!(s.page.nodes.is_empty());
    assert!(!s.page.background_hidden);
    assert_eq!(s.page.scroll, 1_200.0);
    assert!(s.web.navigator().is_settled());
}

#[test]
fn deep_link_boot_and_failed_fetch_retry() {
    let mut s = Session::new();
    s.send(r#"{"kind":"boot","location":"https://news.example/list?page=1&id=42"}"#);
    s.frame();

    let (record, attempt, _) = s.page.pending_fetches.remove(0);
    s.send(&format!(
        r#"{{"kind":"fetch_err","record":{record},"attempt":{attempt},"error":"network"}}"#
    ));
    assert_eq!(s.visible(), vec![("42", "error:network")]);

    s.send(&format!(r#"{{"kind":"retry","record":{record}}}"#));
    assert_eq!(s.visible(), vec![("42", "loading")]);
    s.answer_fetches();
    assert_eq!(s.visible(), vec![("42", "<h1>42</h1>")]);
    assert_eq!(
        s.web.navigator().stack().top().map(|r| r.key()),
        Some(RecordKey::from_raw(record))
    );
}

#[test]
fn home_button_collapses_history() {
    let mut s = Session::new();
    for id in ["a", "b", "c"] {
        s.send(&format!(r#"{{"kind":"open","id":"{id}"}}"#));
    }
    s.frame();
    s.send(r#"{"kind":"close_all"}"#);
    s.wait(400.0);

    assert!(s.page.nodes.is_empty());
    assert_eq!(s.page.location(), HOME);
    assert_eq!(s.page.index, 3);
    assert!(s.web.navigator().is_consistent());
}

#[test]
fn double_tap_close_before_popstate_goes_back_once() {
    let mut s = Session::new();
    s.send(r#"{"kind":"open","id":"a"}"#);
    s.send(r#"{"kind":"open","id":"b"}"#);
    s.frame();

    s.hold_traversals = true;
    s.send(r#"{"kind":"close_top"}"#);
    s.send(r#"{"kind":"close_top"}"#);
    assert_eq!(s.page.backs_requested, 1);
    assert_eq!(s.page.location(), "https://news.example/list?page=1&id=b");

    s.hold_traversals = false;
    s.run_traversals();
    s.wait(400.0);
    assert_eq!(s.page.location(), "https://news.example/list?page=1&id=a");
    assert_eq!(s.page.nodes.len(), 1);
    assert!(s.web.navigator().is_consistent());
}

#[test]
fn empty_open_is_rejected() {
    let mut s = Session::new();
    assert!(s.web.handle_json(r#"{"kind":"open","id":""}"#).is_err());
    assert!(s.web.drain_commands().is_empty());
    assert!(s.web.navigator().stack().is_empty());
    assert!(s.web.navigator().is_consistent());
}
