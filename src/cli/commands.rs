use clap::Subcommand;

use super::capture::CaptureArgs;
use super::permissions::PermissionsArgs;
use super::run::RunArgs;
use super::settings::SettingsArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Let the agent carry out a task on this Mac
    Run(RunArgs),

    /// Take one screenshot and save it as JPEG
    Capture(CaptureArgs),

    /// Show or change persisted settings
    Settings(SettingsArgs),

    /// Explain and open the macOS privacy permissions the agent needs
    Permissions(PermissionsArgs),

    /// Show build information, settings location and model pricing
    Info,
}
