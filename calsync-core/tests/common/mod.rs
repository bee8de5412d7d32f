//! Fake collaborators for driving sync passes in tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use calsync_core::credentials::{AuthToken, CredentialSource};
use calsync_core::diff::PlanCounts;
use calsync_core::provision::{CalendarId, CalendarSpec};
use calsync_core::remote::RemoteSource;
use calsync_core::store::{BatchOp, LocalStore, SqliteStore};
use calsync_core::{Account, LocalIndex, RemoteEvent, SyncError, SyncResult};

pub fn account() -> Account {
    Account::new("jan", "nl.vgst")
}

pub async fn memory_store() -> SqliteStore {
    SqliteStore::open(None)
        .await
        .expect("Failed to create test database")
}

/// Remote feed serving whatever it was last given.
pub struct FakeRemote {
    feed: Mutex<Result<Vec<RemoteEvent>, fn() -> SyncError>>,
    calls: AtomicUsize,
}

impl FakeRemote {
    pub fn serving(events: Vec<RemoteEvent>) -> Self {
        FakeRemote {
            feed: Mutex::new(Ok(events)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: fn() -> SyncError) -> Self {
        FakeRemote {
            feed: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn serve(&self, events: Vec<RemoteEvent>) {
        *self.feed.lock().unwrap() = Ok(events);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch_events(
        &self,
        _account: &Account,
        _token: &AuthToken,
    ) -> SyncResult<Vec<RemoteEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.feed.lock().unwrap() {
            Ok(events) => Ok(events.clone()),
            Err(error) => Err(error()),
        }
    }
}

pub struct FakeCredentials {
    valid: bool,
}

impl FakeCredentials {
    pub fn valid() -> Self {
        FakeCredentials { valid: true }
    }

    pub fn expired() -> Self {
        FakeCredentials { valid: false }
    }
}

impl CredentialSource for FakeCredentials {
    fn auth_token(&self, _account: &Account) -> SyncResult<AuthToken> {
        if self.valid {
            Ok(AuthToken::new("token"))
        } else {
            Err(SyncError::Auth("token expired".to_string()))
        }
    }
}

/// Store whose batches are always rejected.
pub struct RejectingStore {
    pub inner: SqliteStore,
    pub batches: AtomicUsize,
}

impl RejectingStore {
    pub fn new(inner: SqliteStore) -> Self {
        RejectingStore {
            inner,
            batches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LocalStore for RejectingStore {
    async fn find_calendar(&self, account: &Account) -> SyncResult<Option<CalendarId>> {
        self.inner.find_calendar(account).await
    }

    async fn create_calendar(
        &self,
        account: &Account,
        spec: &CalendarSpec,
    ) -> SyncResult<CalendarId> {
        self.inner.create_calendar(account, spec).await
    }

    async fn list_events(&self, calendar: CalendarId) -> SyncResult<LocalIndex> {
        self.inner.list_events(calendar).await
    }

    async fn apply_batch(&self, ops: &[BatchOp]) -> SyncResult<PlanCounts> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        let kind = ops
            .first()
            .map(BatchOp::kind)
            .ok_or_else(|| SyncError::StoreUnavailable("empty batch".to_string()))?;
        Err(SyncError::BatchRejected {
            kind,
            reason: "database is locked".to_string(),
        })
    }
}

/// Store that cannot be reached at all.
pub struct UnreachableStore;

#[async_trait]
impl LocalStore for UnreachableStore {
    async fn find_calendar(&self, _account: &Account) -> SyncResult<Option<CalendarId>> {
        Err(SyncError::StoreUnavailable("connection refused".to_string()))
    }

    async fn create_calendar(
        &self,
        _account: &Account,
        _spec: &CalendarSpec,
    ) -> SyncResult<CalendarId> {
        Err(SyncError::StoreUnavailable("connection refused".to_string()))
    }

    async fn list_events(&self, _calendar: CalendarId) -> SyncResult<LocalIndex> {
        Err(SyncError::StoreUnavailable("connection refused".to_string()))
    }

    async fn apply_batch(&self, _ops: &[BatchOp]) -> SyncResult<PlanCounts> {
        Err(SyncError::StoreUnavailable("connection refused".to_string()))
    }
}
