#![forbid(unsafe_code)]

//! JSON host events.
//!
//! The host reports everything that happens on the page as a small JSON
//! object tagged by `kind`. [`parse_host_event`] decodes and validates one
//! event. Unknown kinds are an error.
//!
//! ```json
//! {"kind":"open","id":"a"}
//! {"kind":"pop_state","location":"https://example.test/?id=a","state":{"hasOverlay":true,"id":"a"}}
//! {"kind":"fetch_ok","record":0,"attempt":0,"body":"<article>…</article>"}
//! {"kind":"touch","phase":"end","x":220,"viewport_width":375}
//! ```

use core::time::Duration;

use serde::Deserialize;
use strata_core::{ContentError, ContentId, FetchTicket, RecordKey};
use strata_nav::{HistoryState, Touch};
use thiserror::Error;

/// Host event decoding failures.
#[derive(Debug, Error)]
pub enum HostEventError {
    #[error("malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid timestamp: {0}")]
    InvalidTime(f64),
}

/// Fetch failure class reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailure {
    NotFound,
    Network,
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

/// Decoded host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    Boot {
        location: String,
        #[serde(default)]
        scroll_offset: f64,
    },
    Open {
        id: ContentId,
    },
    Close {
        record: RecordKey,
    },
    CloseTop,
    CloseAll,
    PopState {
        location: String,
        #[serde(default)]
        state: Option<HistoryState>,
    },
    AnimationFrame {
        now_ms: f64,
    },
    Tick {
        now_ms: f64,
    },
    Scroll {
        offset: f64,
    },
    FetchOk {
        record: RecordKey,
        attempt: u32,
        body: String,
    },
    FetchErr {
        record: RecordKey,
        attempt: u32,
        error: FetchFailure,
        #[serde(default)]
        message: Option<String>,
    },
    Retry {
        record: RecordKey,
    },
    Touch {
        phase: TouchPhase,
        x: f32,
        #[serde(default)]
        y: Option<f32>,
        #[serde(default)]
        viewport_width: Option<f32>,
    },
    Reset,
}

/// Decode and validate one host event.
pub fn parse_host_event(json: &str) -> Result<HostEvent, HostEventError> {
    let event: HostEvent = serde_json::from_str(json)?;
    match &event {
        HostEvent::AnimationFrame { now_ms } | HostEvent::Tick { now_ms } => {
            millis(*now_ms)?;
        }
        HostEvent::Touch { .. } => {
            touch_of(&event)?;
        }
        _ => {}
    }
    Ok(event)
}

/// Host timestamp in milliseconds as a monotonic duration.
pub fn millis(now_ms: f64) -> Result<Duration, HostEventError> {
    if now_ms < 0.0 {
        return Err(HostEventError::InvalidTime(now_ms));
    }
    Duration::try_from_secs_f64(now_ms / 1_000.0).map_err(|_| HostEventError::InvalidTime(now_ms))
}

/// Touch input carried by a `touch` event.
pub fn touch_of(event: &HostEvent) -> Result<Option<Touch>, HostEventError> {
    let HostEvent::Touch {
        phase,
        x,
        y,
        viewport_width,
    } = *event
    else {
        return Ok(None);
    };
    let touch = match phase {
        TouchPhase::Start => Touch::Start {
            x,
            y: y.ok_or(HostEventError::MissingField("y"))?,
        },
        TouchPhase::Move => Touch::Move {
            x,
            y: y.ok_or(HostEventError::MissingField("y"))?,
        },
        TouchPhase::End => Touch::End {
            x,
            viewport_width: viewport_width.ok_or(HostEventError::MissingField("viewport_width"))?,
        },
    };
    Ok(Some(touch))
}

/// Fetch completion carried by `fetch_ok` / `fetch_err`.
pub fn fetch_error(failure: FetchFailure, message: Option<&str>) -> ContentError {
    let detail = message.unwrap_or_default().to_owned();
    match failure {
        FetchFailure::NotFound => ContentError::NotFound,
        FetchFailure::Network => ContentError::Network(detail),
        FetchFailure::Render => ContentError::Render(detail),
    }
}

/// Ticket named by a fetch event.
#[inline]
pub fn ticket(record: RecordKey, attempt: u32) -> FetchTicket {
    FetchTicket { record, attempt }
}
