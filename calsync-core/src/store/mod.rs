//! The local event store.
//!
//! [`LocalStore`] is what a sync pass reads from and writes to.
//! [`SqliteStore`] is the SQLite-backed implementation.

mod batch;
mod sqlite;

pub use batch::{BatchOp, batch_from_plan, format_sync_id, parse_sync_id};
pub use sqlite::{SqliteStore, StoredEvent};

use async_trait::async_trait;

use crate::account::Account;
use crate::diff::{PlanCounts, ReconciliationPlan};
use crate::error::SyncResult;
use crate::event::LocalIndex;
use crate::provision::{CalendarId, CalendarSpec};

#[async_trait]
pub trait LocalStore: Send + Sync {
    /// The calendar filed under `account`, if any.
    async fn find_calendar(&self, account: &Account) -> SyncResult<Option<CalendarId>>;

    /// Create the account's calendar unless one already exists, and return
    /// the id of whichever calendar is there afterwards.
    async fn create_calendar(
        &self,
        account: &Account,
        spec: &CalendarSpec,
    ) -> SyncResult<CalendarId>;

    /// Events currently stored in `calendar`, keyed by external id.
    async fn list_events(&self, calendar: CalendarId) -> SyncResult<LocalIndex>;

    /// Apply all operations or none.
    ///
    /// On failure the error names the kind of operation that was rejected
    /// and the store is left as it was.
    async fn apply_batch(&self, ops: &[BatchOp]) -> SyncResult<PlanCounts>;
}

/// Encode `plan` for `calendar` and apply it as one batch.
pub async fn apply_plan(
    store: &dyn LocalStore,
    calendar: CalendarId,
    plan: &ReconciliationPlan,
) -> SyncResult<PlanCounts> {
    let ops = batch_from_plan(calendar, plan);
    store.apply_batch(&ops).await
}
