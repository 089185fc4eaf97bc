use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use action_primitives::{
    ActionError, ActionExecutor, ClickKind, ClipboardPort, InputPort, Modifiers,
    ScrollDirection, TimingPolicy,
};
use agent_core::agent_loop::CONTINUATION_PROMPT;
use agent_core::{
    ComputerTool, ContentBlock, ConversationRole, ConversationTurn, GatewayError, LogKind,
    ModelGateway, ModelReply, ModelRequest, SessionConfig, SessionError, SessionEvent,
    SessionOrchestrator, SessionOutcome, TokenUsage,
};
use async_trait::async_trait;
use deskpilot_core_types::{LogicalPoint, ScaleFactor};
use parking_lot::Mutex;
use perceiver_visual::{Capture, CaptureError, CapturePort, ImageFormat};
use serde_json::json;

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Clone)]
struct RecordedRequest {
    tool: ComputerTool,
    messages: Vec<ConversationTurn>,
}

#[derive(Default)]
struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<ModelReply, GatewayError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    on_exchange: Mutex<Option<Hook>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    fn with(replies: Vec<Result<ModelReply, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    fn request(&self, index: usize) -> RecordedRequest {
        self.requests.lock()[index].clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn exchange(&self, request: ModelRequest<'_>) -> Result<ModelReply, GatewayError> {
        self.requests.lock().push(RecordedRequest {
            tool: request.tool,
            messages: request.messages.to_vec(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(hook) = self.on_exchange.lock().as_ref() {
            hook();
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(text_reply("Still working on it.")))
    }
}

struct FakeCapture {
    scale: ScaleFactor,
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl FakeCapture {
    fn new(scale: f64) -> Self {
        Self {
            scale: ScaleFactor::new(scale).unwrap(),
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    fn failing_on(scale: f64, call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new(scale)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapturePort for FakeCapture {
    async fn capture(&self) -> Result<Capture, CaptureError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(CaptureError::NoSource("no screen sources found".into()));
        }
        Ok(Capture {
            id: format!("capture-{call}"),
            data: vec![1, 2, 3],
            format: ImageFormat::Jpeg,
            width: 2560,
            height: 1600,
            scale_factor: self.scale,
            timestamp: SystemTime::now(),
        })
    }
}

#[derive(Default)]
struct RecordingInput {
    clicks: Mutex<Vec<(LogicalPoint, ClickKind)>>,
    fail_clicks: bool,
    on_click: Mutex<Option<Hook>>,
}

#[async_trait]
impl InputPort for RecordingInput {
    async fn click(&self, at: LogicalPoint, kind: ClickKind) -> Result<(), ActionError> {
        self.clicks.lock().push((at, kind));
        if let Some(hook) = self.on_click.lock().as_ref() {
            hook();
        }
        if self.fail_clicks {
            return Err(ActionError::Host("click refused".into()));
        }
        Ok(())
    }

    async fn move_cursor(&self, _to: LogicalPoint) -> Result<(), ActionError> {
        Ok(())
    }

    async fn key_code(&self, _code: u16, _modifiers: Modifiers) -> Result<(), ActionError> {
        Ok(())
    }

    async fn keystroke(&self, _text: &str, _modifiers: Modifiers) -> Result<(), ActionError> {
        Ok(())
    }

    async fn scroll_at(
        &self,
        _at: LogicalPoint,
        _direction: ScrollDirection,
        _amount: u32,
    ) -> Result<(), ActionError> {
        Ok(())
    }
}

#[derive(Default)]
struct NullClipboard;

#[async_trait]
impl ClipboardPort for NullClipboard {
    async fn read_text(&self) -> Result<Option<String>, ActionError> {
        Ok(None)
    }

    async fn write_text(&self, _text: &str) -> Result<(), ActionError> {
        Ok(())
    }
}

struct Harness {
    orchestrator: Arc<SessionOrchestrator>,
    gateway: Arc<ScriptedGateway>,
    capture: Arc<FakeCapture>,
    input: Arc<RecordingInput>,
}

fn harness(
    gateway: ScriptedGateway,
    capture: FakeCapture,
    input: RecordingInput,
    config: SessionConfig,
) -> Harness {
    let gateway = Arc::new(gateway);
    let capture = Arc::new(capture);
    let input = Arc::new(input);
    let executor = Arc::new(ActionExecutor::new(
        input.clone(),
        Arc::new(NullClipboard),
        TimingPolicy::immediate(),
    ));
    let orchestrator = SessionOrchestrator::builder()
        .gateway(gateway.clone())
        .capture(capture.clone())
        .executor(executor)
        .config(config)
        .build()
        .unwrap();
    Harness {
        orchestrator: Arc::new(orchestrator),
        gateway,
        capture,
        input,
    }
}

fn stop_hook(orchestrator: &Arc<SessionOrchestrator>) -> Hook {
    let weak: Weak<SessionOrchestrator> = Arc::downgrade(orchestrator);
    Box::new(move || {
        if let Some(orchestrator) = weak.upgrade() {
            orchestrator.request_stop();
        }
    })
}

fn reply(content: Vec<ContentBlock>, input_tokens: u64, output_tokens: u64) -> ModelReply {
    ModelReply {
        content,
        usage: TokenUsage::new(input_tokens, output_tokens),
    }
}

fn text_reply(text: &str) -> ModelReply {
    reply(vec![ContentBlock::text(text)], 10, 5)
}

fn tool_use(id: &str, input: serde_json::Value) -> ContentBlock {
    ContentBlock::ToolUse {
        id: id.into(),
        name: "computer".into(),
        input,
    }
}

fn click(id: &str, x: i64, y: i64) -> ContentBlock {
    tool_use(id, json!({"action": "left_click", "coordinate": [x, y]}))
}

const KEY: &str = "sk-ant-test";

/// Paused-clock timers round up to the next millisecond tick.
fn assert_elapsed(started: tokio::time::Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed <= expected + Duration::from_millis(10),
        "elapsed {elapsed:?}, expected about {expected:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn empty_instructions_never_start() {
    let h = harness(
        ScriptedGateway::default(),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let err = h.orchestrator.run(KEY, "   ").await.unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(h.gateway.calls(), 0);
    assert_eq!(h.capture.calls(), 0);
    assert!(!h.orchestrator.is_running());
}

#[tokio::test(start_paused = true)]
async fn empty_credential_never_starts() {
    let h = harness(
        ScriptedGateway::default(),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let err = h.orchestrator.run("", "open the preset list").await.unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(h.gateway.calls(), 0);
    assert_eq!(h.capture.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn initial_capture_failure_ends_in_error_without_model_call() {
    let h = harness(
        ScriptedGateway::default(),
        FakeCapture::failing_on(2.0, 1),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );
    let mut events = h.orchestrator.events().subscribe();

    let report = h.orchestrator.run(KEY, "do something").await.unwrap();
    assert!(matches!(report.outcome, SessionOutcome::Error { .. }));
    assert_eq!(h.gateway.calls(), 0);
    assert_eq!(report.steps, 0);
    assert_eq!(report.usage, TokenUsage::default());

    let mut saw_remediation = false;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Log(entry) = event {
            if entry.message.contains("Screen Recording") {
                saw_remediation = true;
            }
        }
    }
    assert!(saw_remediation);
}

#[tokio::test(start_paused = true)]
async fn click_is_scaled_before_injection() {
    let h = harness(
        ScriptedGateway::with(vec![
            Ok(reply(vec![click("toolu_1", 500, 300)], 100, 20)),
            Ok(text_reply("TASK COMPLETE: clicked the button")),
        ]),
        FakeCapture::new(2.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let report = h.orchestrator.run(KEY, "click the button").await.unwrap();

    assert_eq!(
        *h.input.clicks.lock(),
        vec![(LogicalPoint::new(250, 150), ClickKind::Left)]
    );
    assert_eq!(
        report.outcome,
        SessionOutcome::Completed {
            summary: "clicked the button".into()
        }
    );
    assert_eq!(report.steps, 1);
    assert_eq!(report.usage, TokenUsage::new(110, 25));
    assert_eq!(h.gateway.request(0).tool, ComputerTool::new(2560, 1600));
}

#[tokio::test(start_paused = true)]
async fn max_steps_counts_model_exchanges() {
    let h = harness(
        ScriptedGateway::default(),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate().max_steps(3),
    );

    let report = h.orchestrator.run(KEY, "never finishes").await.unwrap();
    assert_eq!(report.outcome, SessionOutcome::MaxStepsReached { max_steps: 3 });
    assert_eq!(h.gateway.calls(), 3);
    assert_eq!(report.steps, 3);
    // initial capture plus one per step
    assert_eq!(h.capture.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn completion_sentinel_skips_queued_actions() {
    let h = harness(
        ScriptedGateway::with(vec![Ok(reply(
            vec![
                ContentBlock::text("TASK COMPLETE: nothing left"),
                click("toolu_1", 10, 10),
            ],
            1,
            1,
        ))]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let report = h.orchestrator.run(KEY, "finish").await.unwrap();
    assert!(report.outcome.is_success());
    assert!(h.input.clicks.lock().is_empty());
    assert_eq!(h.capture.calls(), 1);
    // the assistant turn is kept verbatim, tool call included
    let last = report.transcript.last().unwrap();
    assert_eq!(last.role, ConversationRole::Assistant);
    assert_eq!(last.tool_use_ids(), vec!["toolu_1"]);
}

#[tokio::test(start_paused = true)]
async fn first_sentinel_in_block_order_wins() {
    let h = harness(
        ScriptedGateway::with(vec![Ok(reply(
            vec![
                ContentBlock::text("TASK FAILED: preset locked"),
                ContentBlock::text("TASK COMPLETE: ignored"),
            ],
            1,
            1,
        ))]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let report = h.orchestrator.run(KEY, "rename").await.unwrap();
    assert_eq!(
        report.outcome,
        SessionOutcome::Failed {
            reason: "preset locked".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn every_tool_call_gets_exactly_one_result() {
    let h = harness(
        ScriptedGateway::with(vec![
            Ok(reply(
                vec![
                    ContentBlock::text("Let me look around."),
                    click("toolu_a", 4, 4),
                    tool_use("toolu_b", json!({"action": "screenshot"})),
                    tool_use("toolu_c", json!({"action": "triple_click", "coordinate": [1, 1]})),
                    ContentBlock::ToolUse {
                        id: "toolu_d".into(),
                        name: "bash".into(),
                        input: json!({"command": "ls"}),
                    },
                ],
                1,
                1,
            )),
            Ok(text_reply("TASK COMPLETE: ok")),
        ]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    h.orchestrator.run(KEY, "explore").await.unwrap();

    let second = h.gateway.request(1);
    let results = second.messages.last().unwrap();
    assert_eq!(results.role, ConversationRole::User);
    assert_eq!(
        results.tool_result_ids(),
        vec!["toolu_a", "toolu_b", "toolu_c", "toolu_d"]
    );
    assert_eq!(results.content.len(), 4);
    for block in &results.content {
        match block {
            ContentBlock::ToolResult { content, .. } => {
                assert!(matches!(content.as_slice(), [ContentBlock::Image { .. }]));
            }
            other => panic!("unexpected block {other:?}"),
        }
    }
    // only the click reached the host
    assert_eq!(h.input.clicks.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn text_only_turn_gets_image_and_continuation() {
    let h = harness(
        ScriptedGateway::with(vec![
            Ok(text_reply("I can see the editor.")),
            Ok(text_reply("TASK COMPLETE: done")),
        ]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    h.orchestrator.run(KEY, "look").await.unwrap();

    let second = h.gateway.request(1);
    assert_eq!(second.messages.len(), 3);
    let turn = second.messages.last().unwrap();
    assert!(matches!(turn.content[0], ContentBlock::Image { .. }));
    assert_eq!(turn.content[1].as_text(), Some(CONTINUATION_PROMPT));

    let first = h.gateway.request(0);
    let seed = &first.messages[0];
    assert!(matches!(seed.content[0], ContentBlock::Image { .. }));
    assert!(seed.content[1].as_text().unwrap().ends_with("\n\nlook"));
}

#[tokio::test(start_paused = true)]
async fn token_totals_reset_between_sessions() {
    let h = harness(
        ScriptedGateway::with(vec![
            Ok(reply(vec![ContentBlock::text("hm")], 100, 10)),
            Ok(reply(vec![ContentBlock::text("TASK COMPLETE: a")], 50, 5)),
            Ok(reply(vec![ContentBlock::text("TASK COMPLETE: b")], 7, 3)),
        ]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );
    let mut events = h.orchestrator.events().subscribe();

    let first = h.orchestrator.run(KEY, "one").await.unwrap();
    assert_eq!(first.usage, TokenUsage::new(150, 15));

    let mut last_seen = TokenUsage::default();
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Usage { usage, .. } = event {
            assert!(usage.input_tokens >= last_seen.input_tokens);
            assert!(usage.output_tokens >= last_seen.output_tokens);
            last_seen = usage;
        }
    }

    let second = h.orchestrator.run(KEY, "two").await.unwrap();
    assert_eq!(second.usage, TokenUsage::new(7, 3));
    assert!(second.cost_usd < first.cost_usd);
}

#[tokio::test(start_paused = true)]
async fn stop_during_actions_lets_the_batch_finish() {
    let h = harness(
        ScriptedGateway::with(vec![Ok(reply(
            vec![click("toolu_1", 2, 2), click("toolu_2", 4, 4)],
            1,
            1,
        ))]),
        FakeCapture::new(2.0),
        RecordingInput::default(),
        SessionConfig::immediate().max_steps(5),
    );
    *h.input.on_click.lock() = Some(stop_hook(&h.orchestrator));

    let report = h.orchestrator.run(KEY, "click twice").await.unwrap();

    assert_eq!(report.outcome, SessionOutcome::Stopped);
    assert_eq!(h.input.clicks.lock().len(), 2);
    assert_eq!(h.gateway.calls(), 1);
    assert_eq!(report.steps, 1);
    // results for the batch were still recorded
    assert_eq!(
        report.transcript.last().unwrap().tool_result_ids(),
        vec!["toolu_1", "toolu_2"]
    );
}

#[tokio::test(start_paused = true)]
async fn stop_during_last_step_ends_stopped_not_max_steps() {
    let h = harness(
        ScriptedGateway::with(vec![Ok(reply(vec![click("toolu_1", 2, 2)], 1, 1))]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate().max_steps(1),
    );
    *h.input.on_click.lock() = Some(stop_hook(&h.orchestrator));

    let report = h.orchestrator.run(KEY, "click once").await.unwrap();

    assert_eq!(report.outcome, SessionOutcome::Stopped);
    assert_eq!(report.steps, 1);
    assert_eq!(h.input.clicks.lock().len(), 1);
    assert_eq!(
        report.transcript.last().unwrap().tool_result_ids(),
        vec!["toolu_1"]
    );
}

#[tokio::test(start_paused = true)]
async fn stop_seen_after_model_call_skips_actions() {
    let h = harness(
        ScriptedGateway::with(vec![Ok(reply(vec![click("toolu_1", 2, 2)], 1, 1))]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );
    *h.gateway.on_exchange.lock() = Some(stop_hook(&h.orchestrator));

    let report = h.orchestrator.run(KEY, "click").await.unwrap();
    assert_eq!(report.outcome, SessionOutcome::Stopped);
    assert!(h.input.clicks.lock().is_empty());
    assert_eq!(report.usage, TokenUsage::new(1, 1));
}

#[tokio::test(start_paused = true)]
async fn failed_action_does_not_abort_the_step() {
    let h = harness(
        ScriptedGateway::with(vec![
            Ok(reply(vec![click("toolu_1", 2, 2)], 1, 1)),
            Ok(text_reply("TASK COMPLETE: recovered")),
        ]),
        FakeCapture::new(1.0),
        RecordingInput {
            fail_clicks: true,
            ..Default::default()
        },
        SessionConfig::immediate(),
    );
    let mut events = h.orchestrator.events().subscribe();

    let report = h.orchestrator.run(KEY, "click").await.unwrap();
    assert!(report.outcome.is_success());

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Log(entry) = event {
            if entry.kind == LogKind::Error && entry.message.starts_with("Action failed") {
                saw_failure = true;
            }
        }
    }
    assert!(saw_failure);
}

#[tokio::test(start_paused = true)]
async fn gateway_failure_ends_in_error() {
    let h = harness(
        ScriptedGateway::with(vec![Err(GatewayError::Api {
            status: 401,
            message: "invalid x-api-key".into(),
        })]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let report = h.orchestrator.run(KEY, "anything").await.unwrap();
    assert_eq!(
        report.outcome,
        SessionOutcome::Error {
            message: "invalid x-api-key".into()
        }
    );
    assert_eq!(report.usage, TokenUsage::default());
    assert!(!h.orchestrator.is_running());
}

#[tokio::test(start_paused = true)]
async fn recapture_failure_ends_in_error() {
    let h = harness(
        ScriptedGateway::with(vec![Ok(reply(vec![click("toolu_1", 2, 2)], 3, 4))]),
        FakeCapture::failing_on(1.0, 2),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let report = h.orchestrator.run(KEY, "click").await.unwrap();
    assert!(matches!(report.outcome, SessionOutcome::Error { .. }));
    assert_eq!(h.input.clicks.lock().len(), 1);
    assert_eq!(report.usage, TokenUsage::new(3, 4));
}

#[tokio::test(start_paused = true)]
async fn only_one_session_at_a_time() {
    let gateway = ScriptedGateway {
        delay: Some(Duration::from_secs(1)),
        ..ScriptedGateway::with(vec![Ok(text_reply("TASK COMPLETE: first"))])
    };
    let h = harness(
        gateway,
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate(),
    );

    let (first, second) = tokio::join!(
        h.orchestrator.run(KEY, "first"),
        h.orchestrator.run(KEY, "second")
    );
    assert!(first.unwrap().outcome.is_success());
    assert_eq!(second.unwrap_err(), SessionError::AlreadyRunning);
    assert!(!h.orchestrator.request_stop());
}

#[tokio::test(start_paused = true)]
async fn step_pacing_follows_config() {
    let h = harness(
        ScriptedGateway::with(vec![
            Ok(reply(vec![click("toolu_1", 2, 2), click("toolu_2", 4, 4)], 1, 1)),
            Ok(text_reply("TASK COMPLETE: paced")),
        ]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate().step_delay_ms(600),
    );

    let started = tokio::time::Instant::now();
    h.orchestrator.run(KEY, "pace").await.unwrap();
    assert_elapsed(started, Duration::from_millis(1200));
}

#[tokio::test(start_paused = true)]
async fn progress_and_status_lines_are_published() {
    let h = harness(
        ScriptedGateway::with(vec![
            Ok(reply(vec![click("toolu_1", 2, 2)], 1, 1)),
            Ok(text_reply("TASK COMPLETE: fine")),
        ]),
        FakeCapture::new(1.0),
        RecordingInput::default(),
        SessionConfig::immediate().max_steps(4),
    );
    let mut events = h.orchestrator.events().subscribe();

    h.orchestrator.run(KEY, "status").await.unwrap();

    let mut statuses = Vec::new();
    let mut progress = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Status { text } => statuses.push(text),
            SessionEvent::Progress { step, max } => progress.push((step, max)),
            _ => {}
        }
    }
    assert_eq!(progress, vec![(1, 4), (2, 4)]);
    assert!(statuses.contains(&"Step 1 of 4 — thinking…".to_string()));
    assert!(statuses.contains(&"Step 1 — executing: Click at (2, 2)".to_string()));
    assert!(statuses.contains(&"Step 1 — capturing result…".to_string()));
    assert_eq!(statuses.last().map(String::as_str), Some("Session complete ✓"));
}

#[test]
fn builder_requires_every_port() {
    let err = SessionOrchestrator::builder()
        .config(SessionConfig::immediate())
        .build()
        .err()
        .unwrap();
    assert_eq!(err, SessionError::MissingComponent("model gateway"));
}
