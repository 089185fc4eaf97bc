use agent_core::{pricing_for, PRICING};
use anyhow::Result;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

pub fn cmd_info(ctx: &CliContext) -> Result<()> {
    let settings = ctx.settings();
    let active = pricing_for(&settings.model).model;

    if ctx.output() == OutputFormat::Json {
        let pricing: Vec<_> = PRICING
            .iter()
            .map(|entry| {
                json!({
                    "model": entry.model,
                    "input_per_mtok": entry.input_per_mtok,
                    "output_per_mtok": entry.output_per_mtok,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "version": env!("CARGO_PKG_VERSION"),
                "build_date": env!("BUILD_DATE"),
                "git_hash": env!("GIT_HASH"),
                "git_branch": env!("GIT_BRANCH"),
                "settings_path": ctx.settings_path().display().to_string(),
                "model": settings.model,
                "api_key": settings.masked_api_key(),
                "pricing": pricing,
            }))?
        );
        return Ok(());
    }

    println!("deskpilot System Information");
    println!("============================");
    println!("Version:     {}", env!("CARGO_PKG_VERSION"));
    println!("Built:       {}", env!("BUILD_DATE"));
    println!("Commit:      {} ({})", env!("GIT_HASH"), env!("GIT_BRANCH"));
    println!("Settings:    {}", ctx.settings_path().display());
    println!("API key:     {}", settings.masked_api_key());
    println!("Model:       {}", settings.model);
    println!("Target app:  {}", settings.target_app);
    println!();
    println!("Pricing (USD per million tokens, input / output):");
    for entry in PRICING {
        let marker = if entry.model == active { "*" } else { " " };
        println!(
            "  {marker} {:<28} {:>6.2} / {:>6.2}",
            entry.model, entry.input_per_mtok, entry.output_per_mtok
        );
    }
    Ok(())
}
