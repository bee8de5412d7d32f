use serde::Serialize;

use crate::event::{EventRecord, LocalId};

/// A matched remote event that replaces the fields of a local one.
///
/// Only `start_ms`, `end_ms` and `title` of `event` are written; the
/// stored zone label is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventUpdate {
    pub local_id: LocalId,
    pub event: EventRecord,
}

/// The operations one pass needs to make the local calendar match the remote feed.
///
/// The lists are disjoint: an external id is either inserted, updated or
/// unchanged, and a local id is either updated, unchanged or deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub to_insert: Vec<EventRecord>,
    pub to_update: Vec<EventUpdate>,
    pub to_delete: Vec<LocalId>,
    /// Matched events whose stored fields already equal the remote ones
    pub unchanged: Vec<LocalId>,
}

/// Number of operations per kind, as planned or as applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanCounts {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ReconciliationPlan {
    /// True when applying the plan would not change the store.
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn counts(&self) -> PlanCounts {
        PlanCounts {
            inserted: self.to_insert.len(),
            updated: self.to_update.len(),
            deleted: self.to_delete.len(),
        }
    }
}
