//! Session orchestrator: the capture, think, act, recapture loop.
//!
//! One step fully completes (model call, every action, recapture, transcript
//! update) before the next begins. Stop requests are polled at the top of each
//! step and right after the model call returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use action_primitives::{truncate, Action, ActionExecutor};
use parking_lot::Mutex;
use perceiver_visual::{Capture, CapturePort};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::config::SessionConfig;
use super::events::{EventHub, LogKind, SessionEvent, LOG_TEXT_LIMIT};
use super::prompt::{
    format_system_prompt, format_task_message, scan_sentinel, Sentinel, CONTINUATION_PROMPT,
};
use super::state::{Session, SessionOutcome, SessionPhase};
use crate::errors::SessionError;
use crate::gateway::{ComputerTool, ModelGateway, ModelRequest, COMPUTER_TOOL_NAME};
use crate::model::{ContentBlock, ConversationTurn, ImageSource};
use crate::usage::{format_cost, TokenUsage};

/// Everything a finished session leaves behind.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session: Session,
    pub outcome: SessionOutcome,
    pub steps: u32,
    pub usage: TokenUsage,
    pub cost_usd: f64,
    #[serde(skip)]
    pub transcript: Vec<ConversationTurn>,
}

/// A tool invocation awaiting its result block.
struct PendingCall {
    id: String,
    action: Option<Action>,
}

/// What one step decided.
enum StepVerdict {
    Continue,
    Finished(SessionOutcome),
}

pub struct SessionOrchestrator {
    gateway: Arc<dyn ModelGateway>,
    capture: Arc<dyn CapturePort>,
    executor: Arc<ActionExecutor>,
    config: SessionConfig,
    events: EventHub,
    running: AtomicBool,
    stop: Mutex<Option<CancellationToken>>,
}

#[derive(Default)]
pub struct SessionOrchestratorBuilder {
    gateway: Option<Arc<dyn ModelGateway>>,
    capture: Option<Arc<dyn CapturePort>>,
    executor: Option<Arc<ActionExecutor>>,
    config: SessionConfig,
    events: Option<EventHub>,
}

impl SessionOrchestratorBuilder {
    pub fn gateway(mut self, gateway: Arc<dyn ModelGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn capture(mut self, capture: Arc<dyn CapturePort>) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn executor(mut self, executor: Arc<ActionExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn events(mut self, events: EventHub) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Result<SessionOrchestrator, SessionError> {
        Ok(SessionOrchestrator {
            gateway: self
                .gateway
                .ok_or(SessionError::MissingComponent("model gateway"))?,
            capture: self
                .capture
                .ok_or(SessionError::MissingComponent("capture service"))?,
            executor: self
                .executor
                .ok_or(SessionError::MissingComponent("action executor"))?,
            config: self.config,
            events: self.events.unwrap_or_default(),
            running: AtomicBool::new(false),
            stop: Mutex::new(None),
        })
    }
}

/// Clears the single-session flag and the stop token when `run` exits.
struct RunGuard<'a> {
    running: &'a AtomicBool,
    stop: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.stop.lock().take();
        self.running.store(false, Ordering::SeqCst);
    }
}

impl SessionOrchestrator {
    pub fn builder() -> SessionOrchestratorBuilder {
        SessionOrchestratorBuilder::default()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Asks the active session to stop. In-flight actions still finish; no
    /// further step begins. Returns `false` when nothing is running.
    pub fn request_stop(&self) -> bool {
        match self.stop.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Runs one session to a terminal outcome.
    ///
    /// Only validation problems and a concurrent run come back as `Err`;
    /// transport and capture failures end the session as
    /// [`SessionOutcome::Error`].
    pub async fn run(
        &self,
        credential: &str,
        instructions: &str,
    ) -> Result<SessionReport, SessionError> {
        let credential = credential.trim();
        let instructions = instructions.trim();
        if credential.is_empty() {
            return Err(self.reject("API key is required"));
        }
        if instructions.is_empty() {
            return Err(self.reject("task instructions are required"));
        }
        if self.config.max_steps == 0 {
            return Err(self.reject("max steps must be at least 1"));
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SessionError::AlreadyRunning);
        }
        let cancel = CancellationToken::new();
        *self.stop.lock() = Some(cancel.clone());
        let _guard = RunGuard {
            running: &self.running,
            stop: &self.stop,
        };

        let mut session = Session::new(&self.config);
        let mut transcript = Vec::new();
        let outcome = self
            .drive(&mut session, &mut transcript, credential, instructions, &cancel)
            .await;
        Ok(self.finish(session, transcript, outcome))
    }

    fn reject(&self, message: &str) -> SessionError {
        self.events.log(LogKind::Error, message);
        SessionError::validation(message)
    }

    fn set_phase(&self, session: &mut Session, phase: SessionPhase) {
        session.phase = phase.clone();
        self.events.emit(SessionEvent::State(phase));
    }

    #[instrument(skip_all, fields(session = %session.id, model = %session.model))]
    async fn drive(
        &self,
        session: &mut Session,
        transcript: &mut Vec<ConversationTurn>,
        credential: &str,
        instructions: &str,
        cancel: &CancellationToken,
    ) -> SessionOutcome {
        self.set_phase(session, SessionPhase::Starting);
        self.events.status("Starting session…");
        self.events.log(
            LogKind::Info,
            format!(
                "Starting session | Model: {} | Target: {}",
                session.model, session.target_context
            ),
        );
        self.events
            .log(LogKind::Ai, format!("Task: \"{instructions}\""));
        info!(max_steps = session.max_steps, "session started");

        self.set_phase(session, SessionPhase::CapturingInitial);
        self.events.status("Capturing initial screenshot…");
        let mut screen = match self.capture_screen().await {
            Ok(capture) => capture,
            Err(message) => {
                return SessionOutcome::Error {
                    message: format!("Screen capture failed: {message}"),
                }
            }
        };
        let tool = ComputerTool::new(screen.width, screen.height);
        let system = format_system_prompt(&session.target_context);

        transcript.push(ConversationTurn::user(vec![
            ContentBlock::image(image_source(&screen)),
            ContentBlock::text(format_task_message(instructions)),
        ]));

        loop {
            if cancel.is_cancelled() {
                return SessionOutcome::Stopped;
            }
            match self
                .step(session, transcript, &mut screen, credential, &system, tool, cancel)
                .await
            {
                StepVerdict::Continue => {}
                StepVerdict::Finished(outcome) => return outcome,
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all, fields(step = session.step_count + 1))]
    async fn step(
        &self,
        session: &mut Session,
        transcript: &mut Vec<ConversationTurn>,
        screen: &mut Capture,
        credential: &str,
        system: &str,
        tool: ComputerTool,
        cancel: &CancellationToken,
    ) -> StepVerdict {
        let step = session.step_count + 1;
        let max = session.max_steps;

        self.set_phase(session, SessionPhase::AwaitingModel);
        self.events.emit(SessionEvent::Progress { step, max });
        self.events
            .status(format!("Step {step} of {max} — thinking…"));
        self.events.log(LogKind::Step, format!("Step {step}/{max}"));

        let request = ModelRequest {
            credential,
            model: &session.model,
            system,
            tool,
            messages: transcript.as_slice(),
            max_tokens: self.config.max_tokens,
        };
        let reply = match self.gateway.exchange(request).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "model exchange failed");
                return StepVerdict::Finished(SessionOutcome::Error {
                    message: err.to_string(),
                });
            }
        };

        session.usage.accumulate(reply.usage);
        self.events.emit(SessionEvent::Usage {
            usage: session.usage,
            cost_usd: session.cost_usd(),
        });

        let assistant = ConversationTurn::assistant(reply.content);
        let (sentinel, pending) = self.scan_reply(&assistant);
        transcript.push(assistant);

        match sentinel {
            Some(Sentinel::Complete(summary)) => {
                return StepVerdict::Finished(SessionOutcome::Completed { summary })
            }
            Some(Sentinel::Failed(reason)) => {
                return StepVerdict::Finished(SessionOutcome::Failed { reason })
            }
            None => {}
        }
        if cancel.is_cancelled() {
            return StepVerdict::Finished(SessionOutcome::Stopped);
        }

        self.set_phase(session, SessionPhase::ExecutingActions);
        for call in &pending {
            let Some(action) = &call.action else { continue };
            if action.is_screenshot() {
                continue;
            }
            let description = action_primitives::describe(action);
            self.events
                .status(format!("Step {step} — executing: {description}"));
            let report = self.executor.execute(action, screen.scale_factor).await;
            match &report.outcome {
                action_primitives::Outcome::Ok => {}
                action_primitives::Outcome::Degraded { reason }
                | action_primitives::Outcome::Failed { reason } => {
                    self.events
                        .log(LogKind::Error, format!("Action failed: {reason}"));
                }
            }
            tokio::time::sleep(self.config.step_delay()).await;
        }

        self.set_phase(session, SessionPhase::Recapturing);
        self.events
            .status(format!("Step {step} — capturing result…"));
        tokio::time::sleep(self.config.recapture_delay()).await;
        *screen = match self.capture_screen().await {
            Ok(capture) => capture,
            Err(message) => {
                return StepVerdict::Finished(SessionOutcome::Error {
                    message: format!("Screenshot failed: {message}"),
                })
            }
        };

        transcript.push(result_turn(&pending, screen));

        session.step_count = step;
        // A stop raised during this step outranks the step budget.
        if cancel.is_cancelled() {
            return StepVerdict::Finished(SessionOutcome::Stopped);
        }
        if session.step_count >= session.max_steps {
            return StepVerdict::Finished(SessionOutcome::MaxStepsReached { max_steps: max });
        }
        StepVerdict::Continue
    }

    /// Logs text, picks up the first sentinel and queues every tool call.
    fn scan_reply(&self, turn: &ConversationTurn) -> (Option<Sentinel>, Vec<PendingCall>) {
        let mut sentinel = None;
        let mut pending = Vec::new();

        for block in &turn.content {
            match block {
                ContentBlock::Text { text } => {
                    self.events
                        .log(LogKind::Ai, truncate(text, LOG_TEXT_LIMIT));
                    if sentinel.is_none() {
                        sentinel = scan_sentinel(text);
                        match &sentinel {
                            Some(Sentinel::Complete(summary)) => self
                                .events
                                .log(LogKind::Success, format!("Task complete: {summary}")),
                            Some(Sentinel::Failed(reason)) => self
                                .events
                                .log(LogKind::Error, format!("Task failed: {reason}")),
                            None => {}
                        }
                    }
                }
                ContentBlock::ToolUse { id, name, input } => {
                    let action = if name != COMPUTER_TOOL_NAME {
                        warn!(tool = %name, "ignoring undeclared tool");
                        self.events
                            .log(LogKind::Error, format!("Skipping unknown tool '{name}'"));
                        None
                    } else {
                        match Action::from_tool_input(input) {
                            Ok(action) => {
                                self.events
                                    .log(LogKind::Action, action_primitives::describe(&action));
                                Some(action)
                            }
                            Err(err) => {
                                warn!(error = %err, "skipping unusable action");
                                self.events
                                    .log(LogKind::Error, format!("Skipping action: {err}"));
                                None
                            }
                        }
                    };
                    pending.push(PendingCall {
                        id: id.clone(),
                        action,
                    });
                }
                ContentBlock::Image { .. } | ContentBlock::ToolResult { .. } => {}
            }
        }
        (sentinel, pending)
    }

    async fn capture_screen(&self) -> Result<Capture, String> {
        match self.capture.capture().await {
            Ok(capture) => {
                self.events.emit(SessionEvent::Capture {
                    width: capture.width,
                    height: capture.height,
                    jpeg: Arc::new(capture.data.clone()),
                });
                Ok(capture)
            }
            Err(err) => {
                warn!(error = %err, "capture failed");
                if let Some(hint) = err.remediation() {
                    self.events.log(LogKind::Info, hint);
                }
                Err(err.to_string())
            }
        }
    }

    fn finish(
        &self,
        mut session: Session,
        transcript: Vec<ConversationTurn>,
        outcome: SessionOutcome,
    ) -> SessionReport {
        self.events.status(outcome.status_line());
        match &outcome {
            SessionOutcome::Completed { .. } | SessionOutcome::Failed { .. } => {}
            SessionOutcome::Stopped => self.events.log(LogKind::Error, "Session stopped by user"),
            SessionOutcome::MaxStepsReached { max_steps } => self.events.log(
                LogKind::Error,
                format!(
                    "Reached maximum of {max_steps} steps. Try increasing the limit or breaking the task into smaller steps."
                ),
            ),
            SessionOutcome::Error { message } => self
                .events
                .log(LogKind::Error, format!("Session error: {message}")),
        }

        let cost_usd = session.cost_usd();
        info!(
            outcome = outcome.as_str(),
            steps = session.step_count,
            input_tokens = session.usage.input_tokens,
            output_tokens = session.usage.output_tokens,
            cost = %format_cost(cost_usd),
            "session finished"
        );
        self.set_phase(
            &mut session,
            SessionPhase::Terminal {
                outcome: outcome.clone(),
            },
        );

        SessionReport {
            steps: session.step_count,
            usage: session.usage,
            cost_usd,
            outcome,
            session,
            transcript,
        }
    }
}

fn image_source(capture: &Capture) -> ImageSource {
    ImageSource::base64(capture.media_type(), capture.to_base64())
}

/// Next user turn: one result per pending call, or image plus continuation.
fn result_turn(pending: &[PendingCall], screen: &Capture) -> ConversationTurn {
    let image = ContentBlock::image(image_source(screen));
    if pending.is_empty() {
        return ConversationTurn::user(vec![image, ContentBlock::text(CONTINUATION_PROMPT)]);
    }
    ConversationTurn::user(
        pending
            .iter()
            .map(|call| ContentBlock::tool_result(call.id.clone(), vec![image.clone()]))
            .collect(),
    )
}
