use anyhow::Result;
use calsync_core::config::SyncConfig;
use calsync_core::store::LocalStore;
use owo_colors::OwoColorize;

use super::open_store;
use crate::render::Render;

pub async fn run() -> Result<()> {
    let config = SyncConfig::load()?;
    let account = config.account()?;
    let store = open_store(&config).await?;

    println!("{}", account.render());

    let Some(calendar) = store.find_calendar(&account).await? else {
        println!("   {}", "Not synced yet".dimmed());
        return Ok(());
    };

    let events = store.stored_events(calendar).await?;
    if events.is_empty() {
        println!("   {}", "No events".dimmed());
    }

    for event in events {
        println!(
            "   {} {}",
            event.sync_id.dimmed(),
            event.record.render()
        );
    }

    store.close().await;
    Ok(())
}
