use anyhow::Result;

use super::Context;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(ctx: &Context, json: bool) -> Result<()> {
    let spinner = tui::create_spinner(ctx.account.render());
    let stats = ctx.runner.run_once(&ctx.account).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", ctx.account.render());
        println!("{}", stats.render());
    }

    if stats.has_errors() {
        anyhow::bail!("Sync pass failed, see the log output above");
    }

    Ok(())
}
