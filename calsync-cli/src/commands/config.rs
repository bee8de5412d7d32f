use anyhow::Result;
use calsync_core::config::SyncConfig;

pub fn run() -> Result<()> {
    let path = SyncConfig::config_path()?;

    if !path.exists() {
        SyncConfig::create_default_config(&path)?;
    }

    println!("{}", path.display());
    Ok(())
}
