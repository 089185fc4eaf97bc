use anyhow::Result;
use clap::Args;

use crate::host::permissions::{open_privacy_settings, SCREEN_RECORDING_PANE};

#[derive(Args, Clone, Debug)]
pub struct PermissionsArgs {
    /// Open System Settings at the Screen Recording list
    #[arg(long)]
    pub open: bool,
}

pub async fn cmd_permissions(args: PermissionsArgs) -> Result<()> {
    println!("deskpilot drives this Mac through your terminal app, which needs:");
    println!("  • Screen Recording  to take screenshots");
    println!("  • Accessibility     to click, type and scroll via System Events");
    println!();
    println!("Grant both under System Settings → Privacy & Security, then restart the terminal.");

    if args.open {
        open_privacy_settings().await?;
        println!("Opened System Settings.");
    } else {
        println!("Run `deskpilot permissions --open` to jump there ({SCREEN_RECORDING_PANE}).");
    }
    Ok(())
}
