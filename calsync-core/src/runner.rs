//! One sync pass: provision, fetch, reconcile, apply.
//!
//! Passes for the same account must not overlap; whoever schedules them
//! is expected to serialize them.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::account::Account;
use crate::credentials::CredentialSource;
use crate::diff::{PlanCounts, ReconciliationPlan, Reconciler};
use crate::error::{ErrorClass, SyncError, SyncResult};
use crate::event::LocalIndex;
use crate::provision::CalendarProvisioner;
use crate::remote::RemoteSource;
use crate::store::{LocalStore, apply_plan};

/// Outcome of a sync pass, for the scheduler to act on.
///
/// A failed pass has zero mutation counts and exactly one error counter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
    pub io_errors: u64,
    pub parse_errors: u64,
    pub auth_errors: u64,
    pub store_errors: u64,
}

impl SyncStats {
    pub fn record_counts(&mut self, counts: PlanCounts) {
        self.inserted += counts.inserted as u64;
        self.updated += counts.updated as u64;
        self.deleted += counts.deleted as u64;
    }

    pub fn record_error(&mut self, error: &SyncError) {
        match error.class() {
            ErrorClass::Io => self.io_errors += 1,
            ErrorClass::Parse => self.parse_errors += 1,
            ErrorClass::Auth => self.auth_errors += 1,
            ErrorClass::Store => self.store_errors += 1,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.io_errors + self.parse_errors + self.auth_errors + self.store_errors > 0
    }
}

pub struct SyncRunner {
    store: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteSource>,
    credentials: Arc<dyn CredentialSource>,
    provisioner: CalendarProvisioner,
    reconciler: Reconciler,
}

impl SyncRunner {
    pub fn new(
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteSource>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        SyncRunner {
            store,
            remote,
            credentials,
            provisioner: CalendarProvisioner::default(),
            reconciler: Reconciler::from_system(),
        }
    }

    pub fn with_provisioner(mut self, provisioner: CalendarProvisioner) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Run one full pass for `account`.
    ///
    /// Never fails: errors abort the pass and are counted in the returned
    /// statistics. Nothing is written unless the whole plan could be built.
    pub async fn run_once(&self, account: &Account) -> SyncStats {
        let mut stats = SyncStats::default();

        match self.pass(account).await {
            Ok(counts) => {
                info!(
                    account = %account,
                    inserted = counts.inserted,
                    updated = counts.updated,
                    deleted = counts.deleted,
                    "sync pass complete"
                );
                stats.record_counts(counts);
            }
            Err(e) => {
                error!(account = %account, error = %e, "sync pass aborted");
                stats.record_error(&e);
            }
        }

        stats
    }

    async fn pass(&self, account: &Account) -> SyncResult<PlanCounts> {
        // before provisioning, so a credential failure never touches the store
        let token = self.credentials.auth_token(account)?;

        let calendar = self
            .provisioner
            .ensure_calendar(self.store.as_ref(), account)
            .await?;

        let remote = self.remote.fetch_events(account, &token).await?;
        let local = self.store.list_events(calendar).await?;
        let plan = self.reconciler.compute_diff(&remote, &local)?;

        if plan.is_empty() {
            return Ok(PlanCounts::default());
        }

        apply_plan(self.store.as_ref(), calendar, &plan).await
    }

    /// Build the plan a pass would apply, without writing anything.
    ///
    /// An account without a calendar yet is treated as having no local events.
    pub async fn preview(&self, account: &Account) -> SyncResult<ReconciliationPlan> {
        let token = self.credentials.auth_token(account)?;

        let calendar = self
            .provisioner
            .existing_calendar(self.store.as_ref(), account)
            .await?;

        let remote = self.remote.fetch_events(account, &token).await?;
        let local = match calendar {
            Some(calendar) => self.store.list_events(calendar).await?,
            None => LocalIndex::new(),
        };

        self.reconciler.compute_diff(&remote, &local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffKind;

    #[test]
    fn failed_pass_sets_one_counter() {
        let mut stats = SyncStats::default();
        stats.record_error(&SyncError::BatchRejected {
            kind: DiffKind::Update,
            reason: "disk full".into(),
        });

        assert_eq!(
            stats,
            SyncStats {
                store_errors: 1,
                ..SyncStats::default()
            }
        );
        assert!(stats.has_errors());
    }

    #[test]
    fn counts_are_copied() {
        let mut stats = SyncStats::default();
        stats.record_counts(PlanCounts {
            inserted: 2,
            updated: 1,
            deleted: 3,
        });

        assert_eq!((stats.inserted, stats.updated, stats.deleted), (2, 1, 3));
        assert!(!stats.has_errors());
    }
}
