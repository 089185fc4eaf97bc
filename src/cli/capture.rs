use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use perceiver_visual::CapturePort;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::host::ScreencaptureSource;

#[derive(Args, Clone, Debug)]
pub struct CaptureArgs {
    /// Where to write the JPEG
    #[arg(short = 'f', long = "file", value_name = "FILE", default_value = "deskpilot-capture.jpg")]
    pub file: PathBuf,
}

pub async fn cmd_capture(args: CaptureArgs, ctx: &CliContext) -> Result<()> {
    let capture = match ScreencaptureSource.capture().await {
        Ok(capture) => capture,
        Err(err) => {
            if let Some(help) = err.remediation() {
                eprintln!("{help}");
            }
            return Err(err).context("Screen capture failed");
        }
    };

    tokio::fs::write(&args.file, &capture.data)
        .await
        .with_context(|| format!("Failed to write {}", args.file.display()))?;

    let (logical_width, logical_height) = capture.logical_size();
    match ctx.output() {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "file": args.file.display().to_string(),
                "width": capture.width,
                "height": capture.height,
                "scale_factor": capture.scale_factor.get(),
                "logical_width": logical_width,
                "logical_height": logical_height,
                "bytes": capture.data.len(),
            })
        ),
        OutputFormat::Human => {
            println!(
                "Captured {}×{} (scale {}, {}×{} points) → {}",
                capture.width,
                capture.height,
                capture.scale_factor,
                logical_width,
                logical_height,
                args.file.display()
            );
        }
    }
    Ok(())
}
