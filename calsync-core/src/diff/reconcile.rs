//! Three-way classification of remote events against the local index.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::diff::{EventUpdate, ReconciliationPlan};
use crate::error::{SyncError, SyncResult};
use crate::event::{EventRecord, ExternalId, LocalIndex, RemoteEvent};

const MILLIS_PER_SECOND: i64 = 1000;

/// Where the zone label stamped on inserted events comes from.
#[derive(Debug, Clone)]
pub enum ZoneSource {
    Fixed(String),
    /// Looked up each time a plan is built.
    Lookup(fn() -> String),
}

impl ZoneSource {
    /// The device's zone setting.
    pub fn system() -> Self {
        ZoneSource::Lookup(system_time_zone)
    }

    fn resolve(&self) -> String {
        match self {
            ZoneSource::Fixed(zone) => zone.clone(),
            ZoneSource::Lookup(lookup) => lookup(),
        }
    }
}

/// Falls back to UTC when the zone cannot be determined.
pub fn system_time_zone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|e| {
        warn!(error = %e, "could not determine system time zone, using UTC");
        "UTC".to_string()
    })
}

/// Computes reconciliation plans.
#[derive(Debug, Clone)]
pub struct Reconciler {
    zone: ZoneSource,
}

impl Reconciler {
    /// Reconciler stamping a fixed zone label.
    pub fn new(time_zone: &str) -> Self {
        Self::with_zone_source(ZoneSource::Fixed(time_zone.to_string()))
    }

    pub fn with_zone_source(zone: ZoneSource) -> Self {
        Reconciler { zone }
    }

    /// Reconciler stamping the device's zone as set when each plan is built.
    pub fn from_system() -> Self {
        Self::with_zone_source(ZoneSource::system())
    }

    /// Classify every remote event as insert, update or unchanged, and every
    /// local event missing from `remote` as delete.
    ///
    /// Remote events sharing an external id collapse into one entry: it sits
    /// at the position of the first occurrence and carries the fields of the
    /// last one. Insert and update lists otherwise follow input order; the
    /// delete list is sorted by local id.
    ///
    /// Fails with [`SyncError::MalformedEventData`] on the first record that
    /// lacks a field, with `position` being its index in `remote`. No partial
    /// plan is returned.
    pub fn compute_diff(
        &self,
        remote: &[RemoteEvent],
        local: &LocalIndex,
    ) -> SyncResult<ReconciliationPlan> {
        let time_zone = self.zone.resolve();
        let events = collapse(remote, &time_zone)?;

        let mut remaining: HashSet<ExternalId> = local.keys().copied().collect();
        let mut plan = ReconciliationPlan::default();

        for event in events {
            let Some(entry) = local.get(&event.external_id) else {
                debug!(external_id = %event.external_id, "insert event");
                plan.to_insert.push(event);
                continue;
            };

            remaining.remove(&event.external_id);

            if entry.snapshot.as_ref() == Some(&event.snapshot()) {
                plan.unchanged.push(entry.local_id);
            } else {
                debug!(external_id = %event.external_id, local_id = %entry.local_id, "update event");
                plan.to_update.push(EventUpdate {
                    local_id: entry.local_id,
                    event,
                });
            }
        }

        plan.to_delete = remaining
            .iter()
            .filter_map(|external_id| local.get(external_id))
            .map(|entry| entry.local_id)
            .collect();
        plan.to_delete.sort();

        for local_id in &plan.to_delete {
            debug!(local_id = %local_id, "delete event");
        }

        Ok(plan)
    }
}

/// Validate remote events and fold duplicates (last occurrence wins).
fn collapse(remote: &[RemoteEvent], time_zone: &str) -> SyncResult<Vec<EventRecord>> {
    let mut events: Vec<EventRecord> = Vec::with_capacity(remote.len());
    let mut slots: HashMap<ExternalId, usize> = HashMap::new();

    for (position, raw) in remote.iter().enumerate() {
        let event = to_record(position, raw, time_zone)?;

        match slots.get(&event.external_id) {
            Some(&slot) => {
                warn!(external_id = %event.external_id, position, "duplicate external id in remote feed, keeping the later record");
                events[slot] = event;
            }
            None => {
                slots.insert(event.external_id, events.len());
                events.push(event);
            }
        }
    }

    Ok(events)
}

fn to_record(position: usize, raw: &RemoteEvent, time_zone: &str) -> SyncResult<EventRecord> {
    let malformed = |field| SyncError::MalformedEventData { position, field };

    let id = raw.id.ok_or_else(|| malformed("id"))?;
    let start = raw.start.ok_or_else(|| malformed("start"))?;
    let end = raw.end.ok_or_else(|| malformed("end"))?;
    let title = raw.title.as_ref().ok_or_else(|| malformed("title"))?;

    Ok(EventRecord {
        external_id: ExternalId(id),
        start_ms: to_millis(start).ok_or_else(|| malformed("start"))?,
        end_ms: to_millis(end).ok_or_else(|| malformed("end"))?,
        title: title.clone(),
        time_zone: time_zone.to_string(),
    })
}

fn to_millis(seconds: i64) -> Option<i64> {
    seconds.checked_mul(MILLIS_PER_SECOND)
}
