//! Event types shared by the remote feed, the reconciler and the store.
//!
//! Remote events arrive as [`RemoteEvent`]s with second-resolution times.
//! The reconciler turns them into [`EventRecord`]s, which carry
//! millisecond times and are what the local store persists.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The remote system's stable identifier for an event.
///
/// This is the join key between remote and local events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub i64);

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row identifier the local store assigns on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(pub i64);

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields of a stored event the remote feed can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub start_ms: i64,
    pub end_ms: i64,
    pub title: String,
}

/// What the local store knows about one of its events.
///
/// `snapshot` is `None` when only the ids were read; such an entry is
/// always refreshed by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub local_id: LocalId,
    pub snapshot: Option<EventSnapshot>,
}

impl LocalEntry {
    pub fn with_snapshot(local_id: LocalId, snapshot: EventSnapshot) -> Self {
        LocalEntry {
            local_id,
            snapshot: Some(snapshot),
        }
    }
}

impl From<LocalId> for LocalEntry {
    fn from(local_id: LocalId) -> Self {
        LocalEntry {
            local_id,
            snapshot: None,
        }
    }
}

/// Existing local events of one calendar, keyed by external id.
pub type LocalIndex = HashMap<ExternalId, LocalEntry>;

/// An event as delivered by the remote feed.
///
/// Fields are optional so that a record missing one can be reported with
/// its position instead of failing the whole payload decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    #[serde(default)]
    pub id: Option<i64>,
    /// Seconds since the epoch
    #[serde(default)]
    pub start: Option<i64>,
    /// Seconds since the epoch
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
}

impl RemoteEvent {
    pub fn new(id: i64, start: i64, end: i64, title: &str) -> Self {
        RemoteEvent {
            id: Some(id),
            start: Some(start),
            end: Some(end),
            title: Some(title.to_string()),
        }
    }
}

/// A calendar event in local form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub external_id: ExternalId,
    /// Milliseconds since the epoch
    pub start_ms: i64,
    /// Milliseconds since the epoch
    pub end_ms: i64,
    pub title: String,
    /// Zone label stamped when the event is first created locally.
    /// Updates never rewrite it.
    pub time_zone: String,
}

impl EventRecord {
    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot {
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            title: self.title.clone(),
        }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_ms)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.end_ms)
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
