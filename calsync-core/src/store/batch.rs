//! Store-boundary encoding of a reconciliation plan.
//!
//! External ids are stored as text, zero-padded to nine digits, so stores
//! that match the id as a string see a single canonical form.

use crate::diff::{DiffKind, ReconciliationPlan};
use crate::event::{ExternalId, LocalId};
use crate::provision::CalendarId;

const SYNC_ID_WIDTH: usize = 9;

pub fn format_sync_id(id: ExternalId) -> String {
    format!("{:0width$}", id.0, width = SYNC_ID_WIDTH)
}

/// Accepts only the form [`format_sync_id`] writes, since updates select
/// rows by that exact text.
pub fn parse_sync_id(sync_id: &str) -> Option<ExternalId> {
    let id = sync_id.parse().ok().map(ExternalId)?;
    (format_sync_id(id) == sync_id).then_some(id)
}

/// One mutation of the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Insert {
        calendar: CalendarId,
        sync_id: String,
        start_ms: i64,
        end_ms: i64,
        title: String,
        time_zone: String,
    },
    /// Selects the row by `sync_id` within `calendar`
    Update {
        calendar: CalendarId,
        sync_id: String,
        start_ms: i64,
        end_ms: i64,
        title: String,
    },
    Delete {
        local_id: LocalId,
    },
}

impl BatchOp {
    pub fn kind(&self) -> DiffKind {
        match self {
            BatchOp::Insert { .. } => DiffKind::Create,
            BatchOp::Update { .. } => DiffKind::Update,
            BatchOp::Delete { .. } => DiffKind::Delete,
        }
    }
}

/// Inserts first, then updates, then deletes.
pub fn batch_from_plan(calendar: CalendarId, plan: &ReconciliationPlan) -> Vec<BatchOp> {
    let inserts = plan.to_insert.iter().map(|event| BatchOp::Insert {
        calendar,
        sync_id: format_sync_id(event.external_id),
        start_ms: event.start_ms,
        end_ms: event.end_ms,
        title: event.title.clone(),
        time_zone: event.time_zone.clone(),
    });

    let updates = plan.to_update.iter().map(|update| BatchOp::Update {
        calendar,
        sync_id: format_sync_id(update.event.external_id),
        start_ms: update.event.start_ms,
        end_ms: update.event.end_ms,
        title: update.event.title.clone(),
    });

    let deletes = plan
        .to_delete
        .iter()
        .map(|&local_id| BatchOp::Delete { local_id });

    inserts.chain(updates).chain(deletes).collect()
}
