use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::init_logging;
use crate::settings::SettingsStore;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;

    info!("Starting deskpilot v{}", env!("CARGO_PKG_VERSION"));

    let store = SettingsStore::resolve(cli.settings.as_deref())?;
    let mut settings = store.load().await;
    settings.apply_env();
    debug!(path = %store.path().display(), model = %settings.model, "settings ready");
    let cli_context = CliContext::new(store, settings, cli.output);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            debug!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
