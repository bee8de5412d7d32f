use anyhow::Result;
use owo_colors::OwoColorize;

use super::Context;
use crate::render::{PlanRender, Render};
use crate::utils::tui;

pub async fn run(ctx: &Context, all: bool) -> Result<()> {
    let spinner = tui::create_spinner(ctx.account.render());
    let result = ctx.runner.preview(&ctx.account).await;
    spinner.finish_and_clear();

    println!("{}", ctx.account.render());

    match result {
        Ok(plan) => println!("{}", plan.render(all)),
        Err(e) => println!("   {}", e.to_string().red()),
    }

    Ok(())
}
