//! Full-display capture with `screencapture`, scaled by the Finder desktop bounds.

use std::io::ErrorKind;

use async_trait::async_trait;
use deskpilot_core_types::{CoreError, ScaleFactor};
use perceiver_visual::{normalize_screenshot, Capture, CaptureError, CapturePort};
use tokio::process::Command;
use tracing::{debug, warn};

use super::osascript::run_script;

const DESKTOP_BOUNDS_SCRIPT: &str = "tell application \"Finder\" to get bounds of window of desktop";

#[derive(Debug, Default, Clone)]
pub struct ScreencaptureSource;

impl ScreencaptureSource {
    async fn grab_png(&self) -> Result<Vec<u8>, CaptureError> {
        let file = tempfile::Builder::new()
            .prefix("deskpilot-")
            .suffix(".png")
            .tempfile()?;

        let output = Command::new("screencapture")
            .args(["-x", "-t", "png"])
            .arg(file.path())
            .output()
            .await
            .map_err(|err| {
                if err.kind() == ErrorKind::NotFound {
                    CaptureError::NoSource("screencapture is not available on this host".into())
                } else {
                    CaptureError::Io(err)
                }
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CaptureError::Command(if stderr.is_empty() {
                format!("screencapture exited with {}", output.status)
            } else {
                stderr
            }));
        }

        Ok(tokio::fs::read(file.path()).await?)
    }

    async fn logical_width(&self) -> Option<u32> {
        match run_script(DESKTOP_BOUNDS_SCRIPT).await {
            Ok(bounds) => parse_desktop_bounds(&bounds).map(|(width, _)| width),
            Err(err) => {
                warn!(error = %err, "could not read desktop bounds");
                None
            }
        }
    }
}

#[async_trait]
impl CapturePort for ScreencaptureSource {
    async fn capture(&self) -> Result<Capture, CaptureError> {
        let raw = self.grab_png().await?;
        if raw.is_empty() {
            return Err(CaptureError::NoSource(
                "screencapture wrote no image; Screen Recording access is probably missing".into(),
            ));
        }
        let mut capture = normalize_screenshot(&raw, ScaleFactor::IDENTITY)?;

        capture.scale_factor = match self.logical_width().await {
            Some(logical) => derive_scale(capture.width, logical)?,
            None => {
                warn!("assuming a 1x display");
                ScaleFactor::IDENTITY
            }
        };
        debug!(
            width = capture.width,
            height = capture.height,
            scale = %capture.scale_factor,
            "screen captured"
        );
        Ok(capture)
    }
}

/// Parses Finder's `x1, y1, x2, y2` desktop bounds into a logical size.
pub fn parse_desktop_bounds(raw: &str) -> Option<(u32, u32)> {
    let numbers: Vec<i64> = raw
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .ok()?;
    let [x1, y1, x2, y2] = numbers.as_slice() else {
        return None;
    };
    let width = u32::try_from(x2 - x1).ok()?;
    let height = u32::try_from(y2 - y1).ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

pub fn derive_scale(physical_width: u32, logical_width: u32) -> Result<ScaleFactor, CoreError> {
    ScaleFactor::new(f64::from(physical_width) / f64::from(logical_width))
}
