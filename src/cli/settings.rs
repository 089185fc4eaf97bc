use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::settings::{Settings, SETTING_KEYS};

#[derive(Args, Clone, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum SettingsAction {
    /// Show current settings (the API key is masked)
    Show,

    /// Set one setting
    Set {
        /// One of api_key, model, target_app, max_steps, step_delay_ms
        key: String,

        /// New value
        value: String,
    },

    /// Print the settings file location
    Path,

    /// Restore defaults
    Reset,
}

pub async fn cmd_settings(args: SettingsArgs, ctx: &CliContext) -> Result<()> {
    let store = ctx.store();
    match args.action {
        SettingsAction::Show => show(ctx.settings(), ctx),
        SettingsAction::Set { key, value } => {
            // Start from the file, not the env-filled copy, so the key from
            // ANTHROPIC_API_KEY is never written out by accident.
            let mut settings = store.load().await;
            settings.set(&key, &value)?;
            store.save(&settings).await?;
            println!("Updated {key} in {}", store.path().display());
        }
        SettingsAction::Path => println!("{}", store.path().display()),
        SettingsAction::Reset => {
            store.save(&Settings::default()).await?;
            println!("Settings reset to defaults: {}", store.path().display());
        }
    }
    Ok(())
}

fn show(settings: &Settings, ctx: &CliContext) {
    let api_key = settings.masked_api_key();
    match ctx.output() {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "path": ctx.settings_path().display().to_string(),
                "api_key": api_key,
                "model": settings.model,
                "target_app": settings.target_app,
                "max_steps": settings.max_steps,
                "step_delay_ms": settings.step_delay_ms,
            })
        ),
        OutputFormat::Human => {
            println!("Settings ({}):", ctx.settings_path().display());
            let values = [
                api_key,
                settings.model.clone(),
                settings.target_app.clone(),
                settings.max_steps.to_string(),
                settings.step_delay_ms.to_string(),
            ];
            for (key, value) in SETTING_KEYS.iter().zip(values) {
                println!("  {key:<14} {value}");
            }
        }
    }
}
