use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use tokio::time::MissedTickBehavior;

use super::Context;
use crate::render::Render;

/// Passes run one after another on this task, so they never overlap.
pub async fn run(ctx: &Context, interval: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    println!(
        "{} (every {})",
        ctx.account.render(),
        humantime::format_duration(interval)
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let stats = ctx.runner.run_once(&ctx.account).await;
        println!(
            "{} {}",
            Local::now().format("%H:%M:%S").to_string().dimmed(),
            stats.render().trim_start()
        );
    }

    Ok(())
}
