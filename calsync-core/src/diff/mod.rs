//! Diff types and the reconciler that produces them.

mod diff_kind;
mod plan;
mod reconcile;

pub use diff_kind::DiffKind;
pub use plan::{EventUpdate, PlanCounts, ReconciliationPlan};
pub use reconcile::{Reconciler, ZoneSource, system_time_zone};
