use std::path::PathBuf;
use std::sync::Arc;

use agent_core::usage::is_known_model;
use agent_core::{format_cost, SessionEvent, SessionOrchestrator, SessionOutcome, SessionReport};
use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::context::CliContext;
use crate::cli::output::{render_event, OutputFormat};
use crate::host::{self, ScreencaptureSource};
use crate::llm::{ClaudeConfig, ClaudeGateway};
use crate::settings::{validate_api_key, Settings};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// What the agent should do, in plain language
    #[arg(required = true, num_args = 1.., value_name = "TASK")]
    pub instructions: Vec<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Application the agent should work in
    #[arg(long, value_name = "APP")]
    pub target: Option<String>,

    /// Maximum model exchanges
    #[arg(long)]
    pub max_steps: Option<u32>,

    /// Pause after each action in milliseconds
    #[arg(long)]
    pub step_delay_ms: Option<u64>,

    /// Keep the latest screenshot at this path while the session runs
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,
}

impl RunArgs {
    fn task(&self) -> String {
        self.instructions.join(" ").trim().to_string()
    }

    fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(model) = &self.model {
            settings.set("model", model)?;
        }
        if let Some(target) = &self.target {
            settings.set("target_app", target)?;
        }
        if let Some(steps) = self.max_steps {
            settings.set("max_steps", &steps.to_string())?;
        }
        if let Some(delay) = self.step_delay_ms {
            settings.step_delay_ms = delay;
        }
        Ok(())
    }
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let task = args.task();
    if task.is_empty() {
        bail!("task instructions are required");
    }

    let mut settings = ctx.settings().clone();
    args.apply(&mut settings)?;
    validate_api_key(&settings.api_key)?;
    if !is_known_model(&settings.model) {
        warn!(model = %settings.model, "unknown model, cost uses default pricing");
    }

    // Persist the overrides onto the file's own values so a key that only
    // came from ANTHROPIC_API_KEY never reaches disk.
    let mut persisted = ctx.store().load().await;
    args.apply(&mut persisted)?;
    ctx.store().save(&persisted).await?;

    let config = settings.session_config();
    let gateway =
        ClaudeGateway::new(ClaudeConfig::from_env()).context("Failed to build API client")?;
    let executor = host::action_executor(config.timing.clone());
    let orchestrator = Arc::new(
        SessionOrchestrator::builder()
            .gateway(Arc::new(gateway))
            .capture(Arc::new(ScreencaptureSource))
            .executor(Arc::new(executor))
            .config(config)
            .build()?,
    );

    let printer = spawn_printer(&orchestrator, ctx.output(), args.preview.clone());
    let stopper = spawn_ctrl_c(&orchestrator);

    info!(target_app = %settings.target_app, model = %settings.model, "starting session");
    let result = orchestrator.run(&settings.api_key, &task).await;

    stopper.abort();
    let _ = stopper.await;
    drop(orchestrator);
    let _ = printer.await;

    let report = result?;
    print_report(&report, ctx.output())?;
    if !report.outcome.is_success() {
        bail!("session ended as {}", report.outcome.as_str());
    }
    Ok(())
}

/// Prints events until the orchestrator, and with it the event hub, is gone.
fn spawn_printer(
    orchestrator: &SessionOrchestrator,
    format: OutputFormat,
    preview: Option<PathBuf>,
) -> JoinHandle<()> {
    let mut rx = orchestrator.events().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let (SessionEvent::Capture { jpeg, .. }, Some(path)) = (&event, &preview) {
                        if let Err(err) = tokio::fs::write(path, jpeg.as_slice()).await {
                            warn!(path = %path.display(), error = %err, "preview write failed");
                        }
                    }
                    if let Some(line) = render_event(&event, format) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_ctrl_c(orchestrator: &Arc<SessionOrchestrator>) -> JoinHandle<()> {
    let orchestrator = Arc::clone(orchestrator);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stopping after the current step…");
            orchestrator.request_stop();
        }
    })
}

fn print_report(report: &SessionReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("{}", report.outcome.status_line());
    match &report.outcome {
        SessionOutcome::Completed { summary } => println!("  {summary}"),
        SessionOutcome::MaxStepsReached { max_steps } => {
            println!("  Gave up after {max_steps} steps")
        }
        _ => {}
    }
    println!(
        "Steps: {}   Tokens: {} in / {} out   Cost: {}",
        report.steps,
        report.usage.input_tokens,
        report.usage.output_tokens,
        format_cost(report.cost_usd)
    );
    Ok(())
}
