//! Runs translated commands against the host ports.

use std::sync::Arc;
use std::time::Instant;

use deskpilot_core_types::ScaleFactor;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::errors::ActionError;
use crate::keys::{Modifiers, KEY_CODE_PAGE_DOWN, KEY_CODE_PAGE_UP};
use crate::policy::TimingPolicy;
use crate::ports::{ClipboardPort, InputPort};
use crate::translate::{describe, translate};
use crate::types::{Action, InputCommand, ScrollDirection, Translation};

/// Three-way result of one injected action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    /// The primary path failed but a best-effort fallback (or nothing) was enough.
    Degraded { reason: String },
    Failed { reason: String },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    fn failed(err: ActionError) -> Self {
        Outcome::Failed {
            reason: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ActionReport {
    pub kind: &'static str,
    pub description: String,
    pub outcome: Outcome,
    pub latency_ms: u64,
}

pub struct ActionExecutor {
    input: Arc<dyn InputPort>,
    clipboard: Arc<dyn ClipboardPort>,
    timing: TimingPolicy,
}

impl ActionExecutor {
    pub fn new(
        input: Arc<dyn InputPort>,
        clipboard: Arc<dyn ClipboardPort>,
        timing: TimingPolicy,
    ) -> Self {
        Self {
            input,
            clipboard,
            timing,
        }
    }

    /// Executes one action. Never returns an error: host failures land in
    /// [`ActionReport::outcome`]. `screenshot` is a no-op here.
    #[instrument(skip_all, fields(kind = action.kind_name(), scale = %scale))]
    pub async fn execute(&self, action: &Action, scale: ScaleFactor) -> ActionReport {
        let started = Instant::now();
        let description = describe(action);

        let outcome = match translate(action, scale) {
            Translation::Recapture => Outcome::Ok,
            Translation::Command(command) => {
                let outcome = self.run(command).await;
                tokio::time::sleep(self.timing.settle()).await;
                outcome
            }
        };

        match &outcome {
            Outcome::Ok => debug!(%description, "action done"),
            Outcome::Degraded { reason } => warn!(%description, %reason, "action degraded"),
            Outcome::Failed { reason } => warn!(%description, %reason, "action failed"),
        }

        ActionReport {
            kind: action.kind_name(),
            description,
            outcome,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn run(&self, command: InputCommand) -> Outcome {
        match command {
            InputCommand::Click { kind, at } => match self.input.click(at, kind).await {
                Ok(()) => Outcome::Ok,
                Err(err) => Outcome::failed(err),
            },
            InputCommand::MoveCursor { to } => match self.input.move_cursor(to).await {
                Ok(()) => Outcome::Ok,
                Err(err) => Outcome::Degraded {
                    reason: format!("cursor move skipped: {err}"),
                },
            },
            InputCommand::Paste { text } => self.paste(&text).await,
            InputCommand::KeyCode { code, modifiers } => {
                match self.input.key_code(code, modifiers).await {
                    Ok(()) => Outcome::Ok,
                    Err(err) => Outcome::failed(err),
                }
            }
            InputCommand::Keystroke { text, modifiers } => {
                match self.input.keystroke(&text, modifiers).await {
                    Ok(()) => Outcome::Ok,
                    Err(err) => Outcome::failed(err),
                }
            }
            InputCommand::Scroll {
                at,
                direction,
                amount,
            } => {
                let primary = match self.input.scroll_at(at, direction, amount).await {
                    Ok(()) => return Outcome::Ok,
                    Err(err) => err,
                };
                let code = match direction {
                    ScrollDirection::Up => KEY_CODE_PAGE_UP,
                    ScrollDirection::Down => KEY_CODE_PAGE_DOWN,
                };
                match self.input.key_code(code, Modifiers::empty()).await {
                    Ok(()) => Outcome::Degraded {
                        reason: format!("scrolled with page key after: {primary}"),
                    },
                    Err(fallback) => Outcome::Failed {
                        reason: format!("{primary}; page key fallback: {fallback}"),
                    },
                }
            }
        }
    }

    async fn paste(&self, text: &str) -> Outcome {
        // An empty clipboard is restored as empty text.
        let saved = match self.clipboard.read_text().await {
            Ok(saved) => Some(saved.unwrap_or_default()),
            Err(err) => {
                warn!(error = %err, "could not read clipboard, it will not be restored");
                None
            }
        };

        if let Err(err) = self.clipboard.write_text(text).await {
            return Outcome::failed(err);
        }
        tokio::time::sleep(self.timing.paste_lead()).await;
        let pasted = self.input.keystroke("v", Modifiers::COMMAND).await;
        tokio::time::sleep(self.timing.paste_settle()).await;

        // Restore runs detached; a later paste may race it.
        if let Some(previous) = saved {
            let clipboard = Arc::clone(&self.clipboard);
            let delay = self.timing.clipboard_restore();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(err) = clipboard.write_text(&previous).await {
                    warn!(error = %err, "clipboard restore failed");
                }
            });
        }

        match pasted {
            Ok(()) => Outcome::Ok,
            Err(err) => Outcome::failed(err),
        }
    }
}
