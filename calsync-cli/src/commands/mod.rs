pub mod config;
pub mod diff;
pub mod events;
pub mod sync;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use calsync_core::config::SyncConfig;
use calsync_core::credentials::ConfigCredentials;
use calsync_core::provision::CalendarProvisioner;
use calsync_core::remote::HttpRemote;
use calsync_core::store::SqliteStore;
use calsync_core::{Account, SyncRunner};
use tracing::debug;

/// Everything a sync command needs, built from the config file.
pub struct Context {
    pub account: Account,
    pub runner: SyncRunner,
}

impl Context {
    pub async fn load() -> Result<Self> {
        let config = SyncConfig::load()?;
        let account = config.account()?;
        let store = open_store(&config).await?;

        let remote = HttpRemote::new(config.server_url()?, &config.events_path, config.timeout())?;
        let credentials = ConfigCredentials::new(config.token.clone());

        let runner = SyncRunner::new(Arc::new(store), Arc::new(remote), Arc::new(credentials))
            .with_provisioner(CalendarProvisioner::new(config.calendar_spec()));

        Ok(Context { account, runner })
    }
}

pub async fn open_store(config: &SyncConfig) -> Result<SqliteStore> {
    let path = config.database_path()?;
    debug!(path = %path.display(), "opening local store");
    Ok(SqliteStore::open(Some(&path)).await?)
}
