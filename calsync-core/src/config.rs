//! calsync configuration at ~/.config/calsync/config.toml
//!
//! Every key can be overridden from the environment with a `CALSYNC_`
//! prefix, nested keys separated by `__` (e.g. `CALSYNC_ACCOUNT__NAME`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::account::Account;
use crate::error::{SyncError, SyncResult};
use crate::provision::{AccessLevel, CalendarSpec};

const DEFAULT_ACCOUNT_TYPE: &str = "nl.vgst";
const DEFAULT_EVENTS_PATH: &str = "activities/api/getEvents";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_account_type() -> String {
    DEFAULT_ACCOUNT_TYPE.to_string()
}

fn default_events_path() -> String {
    DEFAULT_EVENTS_PATH.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_account_type")]
    pub kind: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        AccountConfig {
            name: String::new(),
            kind: default_account_type(),
        }
    }
}

/// Attributes given to the calendar when it is first created.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub name: String,
    pub display_name: String,
    pub color: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        let spec = CalendarSpec::default();
        CalendarConfig {
            name: spec.name,
            display_name: spec.display_name,
            color: spec.color,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the event server
    pub server_url: Option<String>,

    #[serde(default = "default_events_path")]
    pub events_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// SQLite database file, defaults to the platform data directory
    pub database: Option<PathBuf>,

    /// Bearer token for the event server
    pub token: Option<String>,

    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl SyncConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("calsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, writing a commented default first if there is none.
    pub fn load() -> SyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::build(
            Config::builder()
                .add_source(File::from(config_path).required(false))
                .add_source(
                    Environment::with_prefix("CALSYNC")
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    pub fn from_toml(contents: &str) -> SyncResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> SyncResult<Self> {
        builder
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn account(&self) -> SyncResult<Account> {
        if self.account.name.trim().is_empty() {
            return Err(SyncError::Config("account.name is not set".into()));
        }
        Ok(Account::new(&self.account.name, &self.account.kind))
    }

    pub fn server_url(&self) -> SyncResult<&str> {
        self.server_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| SyncError::Config("server_url is not set".into()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn database_path(&self) -> SyncResult<PathBuf> {
        match &self.database {
            Some(path) => {
                let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
                Ok(PathBuf::from(expanded))
            }
            None => {
                let data_dir = dirs::data_dir().ok_or_else(|| {
                    SyncError::Config("Could not determine data directory".into())
                })?;
                Ok(data_dir.join("calsync").join("calsync.db"))
            }
        }
    }

    pub fn calendar_spec(&self) -> CalendarSpec {
        CalendarSpec {
            name: self.calendar.name.clone(),
            display_name: self.calendar.display_name.clone(),
            color: self.calendar.color,
            access_level: AccessLevel::Read,
            sync_events: true,
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = format!(
            "\
# calsync configuration

# Event server:
# server_url = \"https://example.org/\"
# events_path = \"{DEFAULT_EVENTS_PATH}\"
# timeout_secs = {DEFAULT_TIMEOUT_SECS}

# Bearer token (or set CALSYNC_TOKEN):
# token = \"...\"

# Local database (defaults to the platform data directory):
# database = \"~/.local/share/calsync/calsync.db\"

# [account]
# name = \"you@example.org\"
# type = \"{DEFAULT_ACCOUNT_TYPE}\"

# [calendar]
# name = \"VGST\"
# display_name = \"VGST\"
# color = -4521848
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
