#![forbid(unsafe_code)]

//! Identifiers shared across the navigation engine.
//!
//! Two kinds of identity exist and must never be confused:
//!
//! - [`ContentId`] names *what* an overlay shows. It is the value carried in
//!   the URL query parameter and may appear on more than one record at a time
//!   (a closing ghost and its reopened successor).
//! - [`RecordKey`] names *which* overlay instance. It is allocated from a
//!   per-stack monotonic counter and never reused, so fetch tickets and
//!   timers keyed by it cannot be confused with a later record for the same
//!   content.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a piece of content shown in an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw identifier.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ContentId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl PartialEq<str> for ContentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ContentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identity of one overlay record; doubles as its stack position.
///
/// Keys are strictly increasing in creation order, so ordering keys orders
/// records bottom to top.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(u64);

impl RecordKey {
    /// Build a key from its raw position.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw position value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Correlates an asynchronous content fetch with the record that issued it.
///
/// `attempt` increments on every retry of the same record so that a late
/// completion from an abandoned attempt is recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket {
    pub record: RecordKey,
    pub attempt: u32,
}

impl FetchTicket {
    /// First attempt for a record.
    #[must_use]
    pub const fn first(record: RecordKey) -> Self {
        Self { record, attempt: 0 }
    }

    /// Ticket for the next attempt on the same record.
    #[must_use]
    pub const fn next_attempt(self) -> Self {
        Self {
            record: self.record,
            attempt: self.attempt.wrapping_add(1),
        }
    }
}
