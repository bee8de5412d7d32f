//! Calendar provisioning.
//!
//! Every account syncs into exactly one calendar. The provisioner looks it
//! up and creates it on first use. Creation goes through
//! [`LocalStore::create_calendar`], a conditional insert, so two racing
//! passes still end up with a single calendar.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::account::Account;
use crate::error::{ErrorClass, SyncError, SyncResult};
use crate::store::LocalStore;

/// Identifier of a calendar in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarId(pub i64);

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the user may do with events in a provisioned calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Owner,
}

impl AccessLevel {
    /// Numeric level as stored, matching the platform calendar provider.
    pub fn code(&self) -> i64 {
        match self {
            AccessLevel::Read => 200,
            AccessLevel::Owner => 700,
        }
    }
}

/// Attributes of a newly created calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSpec {
    pub name: String,
    pub display_name: String,
    /// ARGB color packed into a signed integer
    pub color: i32,
    pub access_level: AccessLevel,
    pub sync_events: bool,
}

impl Default for CalendarSpec {
    fn default() -> Self {
        CalendarSpec {
            name: "VGST".to_string(),
            display_name: "VGST".to_string(),
            color: -4521848,
            access_level: AccessLevel::Read,
            sync_events: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CalendarProvisioner {
    spec: CalendarSpec,
}

impl CalendarProvisioner {
    pub fn new(spec: CalendarSpec) -> Self {
        CalendarProvisioner { spec }
    }

    /// Return the account's calendar, creating it if missing.
    ///
    /// Every failure is reported as a store error.
    pub async fn ensure_calendar(
        &self,
        store: &dyn LocalStore,
        account: &Account,
    ) -> SyncResult<CalendarId> {
        if let Some(id) = self.existing_calendar(store, account).await? {
            debug!(calendar_id = %id, "calendar already provisioned");
            return Ok(id);
        }

        let id = store
            .create_calendar(account, &self.spec)
            .await
            .map_err(as_store_error)?;
        info!(calendar_id = %id, account = %account, "provisioned calendar");
        Ok(id)
    }

    /// Look the account's calendar up without creating it.
    pub async fn existing_calendar(
        &self,
        store: &dyn LocalStore,
        account: &Account,
    ) -> SyncResult<Option<CalendarId>> {
        store.find_calendar(account).await.map_err(as_store_error)
    }
}

fn as_store_error(e: SyncError) -> SyncError {
    match e.class() {
        ErrorClass::Store => e,
        _ => SyncError::StoreUnavailable(e.to_string()),
    }
}
