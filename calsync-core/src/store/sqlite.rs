use std::path::Path;

use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use crate::account::Account;
use crate::diff::PlanCounts;
use crate::error::{SyncError, SyncResult};
use crate::event::{EventRecord, EventSnapshot, LocalEntry, LocalId, LocalIndex};
use crate::provision::{CalendarId, CalendarSpec};
use crate::store::{BatchOp, LocalStore, parse_sync_id};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// A stored event together with its store-side identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub local_id: LocalId,
    pub sync_id: String,
    pub record: EventRecord,
}

#[derive(Debug, FromRow)]
struct EventRow {
    id: i64,
    sync_id: String,
    dtstart: i64,
    dtend: i64,
    title: String,
    event_timezone: String,
}

impl EventRow {
    fn into_stored(self) -> SyncResult<StoredEvent> {
        let external_id = parse_sync_id(&self.sync_id).ok_or_else(|| {
            SyncError::StoreUnavailable(format!(
                "Event {} has a malformed sync id {:?}",
                self.id, self.sync_id
            ))
        })?;

        Ok(StoredEvent {
            local_id: LocalId(self.id),
            sync_id: self.sync_id,
            record: EventRecord {
                external_id,
                start_ms: self.dtstart,
                end_ms: self.dtend,
                title: self.title,
                time_zone: self.event_timezone,
            },
        })
    }
}

impl SqliteStore {
    /// Opens a sqlite database connection.
    /// If `filename` is `None`, it opens an in-memory database.
    pub async fn open(filename: Option<&Path>) -> SyncResult<Self> {
        let (options, pool_options) = if let Some(filename) = filename {
            info!(path = %filename.display(), "connecting to SQLite database");
            if let Some(parent) = filename.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let options = SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true);
            (options, SqlitePoolOptions::new())
        } else {
            info!("connecting to in-memory SQLite database");
            // an in-memory database is gone once its last connection closes
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (SqliteConnectOptions::new().in_memory(true), pool_options)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            SyncError::StoreUnavailable(format!("Failed to connect to SQLite database: {e}"))
        })?;

        sqlx::migrate!("src/store/migrations") // relative path from the crate root
            .run(&pool)
            .await
            .map_err(|e| SyncError::StoreUnavailable(format!("Failed to run migrations: {e}")))?;

        Ok(SqliteStore { pool })
    }

    /// All events of `calendar`, ordered by start time.
    pub async fn stored_events(&self, calendar: CalendarId) -> SyncResult<Vec<StoredEvent>> {
        const SQL: &str = "\
SELECT id, sync_id, dtstart, dtend, title, event_timezone
FROM events
WHERE calendar_id = ?
ORDER BY dtstart ASC, id ASC;
";

        let rows: Vec<EventRow> = sqlx::query_as(SQL)
            .bind(calendar.0)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(EventRow::into_stored).collect()
    }

    pub async fn close(self) {
        debug!("closing database connection");
        self.pool.close().await;
    }
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn find_calendar(&self, account: &Account) -> SyncResult<Option<CalendarId>> {
        const SQL: &str = "SELECT id FROM calendars WHERE account_name = ? AND account_type = ?;";

        let row: Option<(i64,)> = sqlx::query_as(SQL)
            .bind(&account.name)
            .bind(&account.kind)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id,)| CalendarId(id)))
    }

    async fn create_calendar(
        &self,
        account: &Account,
        spec: &CalendarSpec,
    ) -> SyncResult<CalendarId> {
        const INSERT: &str = "\
INSERT INTO calendars
    (account_name, account_type, name, display_name, color, access_level, sync_events)
VALUES (?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(account_name, account_type) DO NOTHING;
";
        const SELECT: &str =
            "SELECT id FROM calendars WHERE account_name = ? AND account_type = ?;";

        let mut tx = self.pool.begin().await?;

        sqlx::query(INSERT)
            .bind(&account.name)
            .bind(&account.kind)
            .bind(&spec.name)
            .bind(&spec.display_name)
            .bind(spec.color)
            .bind(spec.access_level.code())
            .bind(spec.sync_events)
            .execute(&mut *tx)
            .await?;

        let (id,): (i64,) = sqlx::query_as(SELECT)
            .bind(&account.name)
            .bind(&account.kind)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CalendarId(id))
    }

    async fn list_events(&self, calendar: CalendarId) -> SyncResult<LocalIndex> {
        let mut index = LocalIndex::new();

        for stored in self.stored_events(calendar).await? {
            let entry = LocalEntry::with_snapshot(
                stored.local_id,
                EventSnapshot {
                    start_ms: stored.record.start_ms,
                    end_ms: stored.record.end_ms,
                    title: stored.record.title,
                },
            );

            if let Some(existing) = index.insert(stored.record.external_id, entry) {
                warn!(
                    external_id = %stored.record.external_id,
                    local_id = %existing.local_id,
                    "two local events share an external id"
                );
            }
        }

        Ok(index)
    }

    async fn apply_batch(&self, ops: &[BatchOp]) -> SyncResult<PlanCounts> {
        const INSERT: &str = "\
INSERT INTO events (calendar_id, sync_id, dtstart, dtend, title, event_timezone)
VALUES (?, ?, ?, ?, ?, ?);
";
        const UPDATE: &str = "\
UPDATE events SET dtstart = ?, dtend = ?, title = ?
WHERE sync_id = ? AND calendar_id = ?;
";
        const DELETE: &str = "DELETE FROM events WHERE id = ?;";

        let mut counts = PlanCounts::default();
        let mut tx = self.pool.begin().await?;

        for op in ops {
            let query = match op {
                BatchOp::Insert {
                    calendar,
                    sync_id,
                    start_ms,
                    end_ms,
                    title,
                    time_zone,
                } => sqlx::query(INSERT)
                    .bind(calendar.0)
                    .bind(sync_id)
                    .bind(start_ms)
                    .bind(end_ms)
                    .bind(title)
                    .bind(time_zone),
                BatchOp::Update {
                    calendar,
                    sync_id,
                    start_ms,
                    end_ms,
                    title,
                } => sqlx::query(UPDATE)
                    .bind(start_ms)
                    .bind(end_ms)
                    .bind(title)
                    .bind(sync_id)
                    .bind(calendar.0),
                BatchOp::Delete { local_id } => sqlx::query(DELETE).bind(local_id.0),
            };

            let affected = query
                .execute(&mut *tx)
                .await
                .map_err(|e| SyncError::BatchRejected {
                    kind: op.kind(),
                    reason: e.to_string(),
                })?
                .rows_affected() as usize;

            match op {
                BatchOp::Insert { .. } => counts.inserted += affected,
                BatchOp::Update { .. } => counts.updated += affected,
                BatchOp::Delete { .. } => counts.deleted += affected,
            }
        }

        tx.commit().await?;
        debug!(?counts, "applied batch");
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffKind;
    use crate::event::ExternalId;

    async fn setup_test_store() -> SqliteStore {
        SqliteStore::open(None)
            .await
            .expect("Failed to create test database")
    }

    fn account() -> Account {
        Account::new("jan", "nl.vgst")
    }

    fn insert(calendar: CalendarId, sync_id: &str, title: &str) -> BatchOp {
        BatchOp::Insert {
            calendar,
            sync_id: sync_id.to_string(),
            start_ms: 1_000_000,
            end_ms: 2_000_000,
            title: title.to_string(),
            time_zone: "Europe/Amsterdam".to_string(),
        }
    }

    #[tokio::test]
    async fn create_calendar_is_idempotent() {
        let store = setup_test_store().await;
        let spec = CalendarSpec::default();

        assert_eq!(store.find_calendar(&account()).await.unwrap(), None);

        let first = store.create_calendar(&account(), &spec).await.unwrap();
        let second = store.create_calendar(&account(), &spec).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.find_calendar(&account()).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn accounts_get_separate_calendars() {
        let store = setup_test_store().await;
        let spec = CalendarSpec::default();

        let jan = store.create_calendar(&account(), &spec).await.unwrap();
        let piet = store
            .create_calendar(&Account::new("piet", "nl.vgst"), &spec)
            .await
            .unwrap();

        assert_ne!(jan, piet);
    }

    #[tokio::test]
    async fn apply_batch_inserts_updates_and_deletes() {
        let store = setup_test_store().await;
        let calendar = store
            .create_calendar(&account(), &CalendarSpec::default())
            .await
            .unwrap();

        store
            .apply_batch(&[
                insert(calendar, "000000001", "A"),
                insert(calendar, "000000002", "B"),
            ])
            .await
            .unwrap();

        let index = store.list_events(calendar).await.unwrap();
        let doomed = index[&ExternalId(2)].local_id;

        let counts = store
            .apply_batch(&[
                BatchOp::Update {
                    calendar,
                    sync_id: "000000001".to_string(),
                    start_ms: 5_000_000,
                    end_ms: 6_000_000,
                    title: "A2".to_string(),
                },
                BatchOp::Delete { local_id: doomed },
            ])
            .await
            .unwrap();

        assert_eq!(
            counts,
            PlanCounts {
                inserted: 0,
                updated: 1,
                deleted: 1
            }
        );

        let events = store.stored_events(calendar).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sync_id, "000000001");
        assert_eq!(events[0].record.title, "A2");
        assert_eq!(events[0].record.start_ms, 5_000_000);
        assert_eq!(events[0].record.time_zone, "Europe/Amsterdam");
    }

    #[tokio::test]
    async fn update_does_not_cross_calendars() {
        let store = setup_test_store().await;
        let spec = CalendarSpec::default();
        let mine = store.create_calendar(&account(), &spec).await.unwrap();
        let theirs = store
            .create_calendar(&Account::new("piet", "nl.vgst"), &spec)
            .await
            .unwrap();

        store
            .apply_batch(&[insert(theirs, "000000001", "theirs")])
            .await
            .unwrap();

        let counts = store
            .apply_batch(&[BatchOp::Update {
                calendar: mine,
                sync_id: "000000001".to_string(),
                start_ms: 0,
                end_ms: 0,
                title: "hijacked".to_string(),
            }])
            .await
            .unwrap();

        assert_eq!(counts.updated, 0);
        let events = store.stored_events(theirs).await.unwrap();
        assert_eq!(events[0].record.title, "theirs");
    }

    #[tokio::test]
    async fn rejected_batch_leaves_store_untouched() {
        let store = setup_test_store().await;
        let calendar = store
            .create_calendar(&account(), &CalendarSpec::default())
            .await
            .unwrap();

        let result = store
            .apply_batch(&[
                insert(calendar, "000000001", "A"),
                insert(calendar, "000000001", "A again"),
            ])
            .await;

        match result {
            Err(SyncError::BatchRejected { kind, .. }) => assert_eq!(kind, DiffKind::Create),
            other => panic!("expected BatchRejected, got {other:?}"),
        }
        assert!(store.stored_events(calendar).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_update_rolls_back_earlier_inserts() {
        let store = setup_test_store().await;
        let calendar = store
            .create_calendar(&account(), &CalendarSpec::default())
            .await
            .unwrap();
        store
            .apply_batch(&[insert(calendar, "000000001", "A")])
            .await
            .unwrap();
        sqlx::query(
            "CREATE TRIGGER no_updates BEFORE UPDATE ON events \
             BEGIN SELECT RAISE(ABORT, 'read-only'); END;",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let result = store
            .apply_batch(&[
                insert(calendar, "000000002", "B"),
                BatchOp::Update {
                    calendar,
                    sync_id: "000000001".to_string(),
                    start_ms: 0,
                    end_ms: 0,
                    title: "A2".to_string(),
                },
            ])
            .await;

        match result {
            Err(SyncError::BatchRejected { kind, .. }) => assert_eq!(kind, DiffKind::Update),
            other => panic!("expected BatchRejected, got {other:?}"),
        }
        let events = store.stored_events(calendar).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record.title, "A");
    }

    #[tokio::test]
    async fn rejected_delete_names_its_kind() {
        let store = setup_test_store().await;
        let calendar = store
            .create_calendar(&account(), &CalendarSpec::default())
            .await
            .unwrap();
        store
            .apply_batch(&[insert(calendar, "000000001", "A")])
            .await
            .unwrap();
        let local_id = store.list_events(calendar).await.unwrap()[&ExternalId(1)].local_id;
        sqlx::query(
            "CREATE TRIGGER no_deletes BEFORE DELETE ON events \
             BEGIN SELECT RAISE(ABORT, 'read-only'); END;",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let result = store
            .apply_batch(&[
                insert(calendar, "000000002", "B"),
                BatchOp::Delete { local_id },
            ])
            .await;

        match result {
            Err(SyncError::BatchRejected { kind, .. }) => assert_eq!(kind, DiffKind::Delete),
            other => panic!("expected BatchRejected, got {other:?}"),
        }
        let events = store.stored_events(calendar).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sync_id, "000000001");
    }

    #[tokio::test]
    async fn list_events_rejects_non_canonical_sync_id() {
        let store = setup_test_store().await;
        let calendar = store
            .create_calendar(&account(), &CalendarSpec::default())
            .await
            .unwrap();
        store
            .apply_batch(&[insert(calendar, "42", "A")])
            .await
            .unwrap();

        let result = store.list_events(calendar).await;

        assert!(matches!(result, Err(SyncError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn list_events_carries_snapshots() {
        let store = setup_test_store().await;
        let calendar = store
            .create_calendar(&account(), &CalendarSpec::default())
            .await
            .unwrap();
        store
            .apply_batch(&[insert(calendar, "000000042", "A")])
            .await
            .unwrap();

        let index = store.list_events(calendar).await.unwrap();

        let entry = &index[&ExternalId(42)];
        assert_eq!(
            entry.snapshot,
            Some(EventSnapshot {
                start_ms: 1_000_000,
                end_ms: 2_000_000,
                title: "A".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("calsync.db");

        let store = SqliteStore::open(Some(&path)).await.unwrap();
        store.close().await;

        assert!(path.exists());
    }
}
