use anyhow::{bail, Result};
use tokio::process::Command;
use tracing::warn;

/// Deep link to the Screen Recording list.
pub const SCREEN_RECORDING_PANE: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_ScreenCapture";
pub const SECURITY_PANE: &str = "/System/Library/PreferencePanes/Security.prefPane";

async fn open(target: &str) -> Result<()> {
    let status = Command::new("open").arg(target).status().await?;
    if !status.success() {
        bail!("open {target} exited with {status}");
    }
    Ok(())
}

/// Opens the Screen Recording privacy pane, falling back to the Security pane.
pub async fn open_privacy_settings() -> Result<()> {
    match open(SCREEN_RECORDING_PANE).await {
        Ok(()) => Ok(()),
        Err(err) => {
            warn!(error = %err, "privacy pane deep link failed, opening Security");
            open(SECURITY_PANE).await
        }
    }
}
