use super::capture::cmd_capture;
use super::env::CliArgs;
use super::info::cmd_info;
use super::permissions::cmd_permissions;
use super::run::cmd_run;
use super::settings::cmd_settings;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Capture(args) => cmd_capture(args, ctx).await,
        Commands::Settings(args) => cmd_settings(args, ctx).await,
        Commands::Permissions(args) => cmd_permissions(args).await,
        Commands::Info => cmd_info(ctx),
    }
}
