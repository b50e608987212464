//! Event sequence verification.
//!
//! The [`EventVerifier`] enforces the AG-UI grammar over an ordered event
//! sequence: a run opens with `RUN_STARTED`, messages and tool calls are
//! properly nested and closed, steps are balanced, and nothing follows a
//! terminal `RUN_ERROR`. The first illegal event fails with a
//! [`ProtocolError`]; there is no resynchronization.

use ag_ui_core::{Event, EventType, ProtocolError};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Configuration for event verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Reject `RUN_FINISHED` while a message, tool call, or thinking step is
    /// still open, not only while steps are active.
    pub require_closed_entities: bool,
    /// Accept `RUN_STARTED` after `RUN_FINISHED` as the start of a new run.
    pub allow_new_run_after_finish: bool,
    /// Run [`Event::validate`] on every event before the state checks.
    pub validate_payloads: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            require_closed_entities: true,
            allow_new_run_after_finish: true,
            validate_payloads: false,
        }
    }
}

impl VerifierConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether `RUN_FINISHED` requires every entity to be closed.
    #[must_use]
    pub fn require_closed_entities(mut self, enabled: bool) -> Self {
        self.require_closed_entities = enabled;
        self
    }

    /// Set whether a finished run may be followed by a new `RUN_STARTED`.
    #[must_use]
    pub fn allow_new_run_after_finish(mut self, enabled: bool) -> Self {
        self.allow_new_run_after_finish = enabled;
        self
    }

    /// Set whether event payloads are validated.
    #[must_use]
    pub fn validate_payloads(mut self, enabled: bool) -> Self {
        self.validate_payloads = enabled;
        self
    }
}

/// Lifecycle phase of the run being verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// No event seen yet.
    #[default]
    Idle,
    /// `RUN_STARTED` seen, run in progress.
    Running,
    /// `RUN_FINISHED` seen.
    Finished,
    /// `RUN_ERROR` seen. Terminal.
    Errored,
}

/// Verifier state for one run.
///
/// Holds exactly the entities that have started but not yet ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifierState {
    phase: RunPhase,
    active_message_id: Option<String>,
    active_tool_call_id: Option<String>,
    active_steps: IndexSet<String>,
    thinking_step: bool,
    thinking_message: bool,
}

impl VerifierState {
    /// Current run phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// ID of the open text message, if any.
    pub fn active_message_id(&self) -> Option<&str> {
        self.active_message_id.as_deref()
    }

    /// ID of the open tool call, if any.
    pub fn active_tool_call_id(&self) -> Option<&str> {
        self.active_tool_call_id.as_deref()
    }

    /// Names of active steps, in start order.
    pub fn active_steps(&self) -> impl Iterator<Item = &str> {
        self.active_steps.iter().map(String::as_str)
    }

    /// Whether a thinking step is open.
    pub fn is_thinking(&self) -> bool {
        self.thinking_step
    }

    /// Whether a thinking text message is open.
    pub fn is_thinking_message_active(&self) -> bool {
        self.thinking_message
    }

    /// Describe every open entity, steps excluded.
    fn open_entities(&self) -> Vec<String> {
        let mut open = Vec::new();
        if let Some(id) = &self.active_message_id {
            open.push(format!("text message '{id}'"));
        }
        if let Some(id) = &self.active_tool_call_id {
            open.push(format!("tool call '{id}'"));
        }
        if self.thinking_message {
            open.push("thinking text message".to_string());
        }
        if self.thinking_step {
            open.push("thinking step".to_string());
        }
        open
    }
}

fn violation(event_type: EventType, message: impl Into<String>) -> ProtocolError {
    ProtocolError::new(event_type, message)
}

/// Sequential verifier for one AG-UI event stream.
///
/// Construct one verifier per stream; state is never shared.
///
/// # Example
///
/// ```rust
/// use ag_ui_core::{Event, RunFinishedEvent, RunStartedEvent, TextMessageContentEvent};
/// use ag_ui_streaming::EventVerifier;
///
/// let mut verifier = EventVerifier::new();
/// verifier.verify(RunStartedEvent::new("thread-1", "run-1").into()).unwrap();
///
/// // Content without a started message is rejected.
/// let err = verifier
///     .verify(TextMessageContentEvent::new("msg-1", "hi").into())
///     .unwrap_err();
/// assert!(err.message.contains("No active text message"));
///
/// verifier.verify(RunFinishedEvent::new("thread-1", "run-1").into()).unwrap();
/// assert!(verifier.is_run_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventVerifier {
    config: VerifierConfig,
    state: VerifierState,
}

impl EventVerifier {
    /// Create a verifier with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verifier with the given configuration.
    pub fn with_config(config: VerifierConfig) -> Self {
        Self {
            config,
            state: VerifierState::default(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Get the current state.
    pub fn state(&self) -> &VerifierState {
        &self.state
    }

    /// Current run phase.
    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    /// Whether the run has reached `RUN_FINISHED` or `RUN_ERROR`.
    pub fn is_run_complete(&self) -> bool {
        matches!(self.state.phase, RunPhase::Finished | RunPhase::Errored)
    }

    /// Forget all state, as if no event had been seen.
    pub fn reset(&mut self) {
        debug!("resetting event verifier");
        self.state = VerifierState::default();
    }

    /// Verify an event, passing it through unchanged when legal.
    pub fn verify(&mut self, event: Event) -> Result<Event, ProtocolError> {
        self.check(&event)?;
        Ok(event)
    }

    /// Verify an event by reference and apply its state transition.
    ///
    /// A rejected event leaves the state untouched.
    pub fn check(&mut self, event: &Event) -> Result<(), ProtocolError> {
        let event_type = event.event_type();
        trace!(event_type = %event_type, phase = ?self.state.phase, "verifying event");

        let result = self.transition(event);
        if let Err(ref err) = result {
            warn!(event_type = %event_type, error = %err, "AG-UI protocol violation");
        }
        result
    }

    fn transition(&mut self, event: &Event) -> Result<(), ProtocolError> {
        if self.config.validate_payloads {
            event.validate()?;
        }
        self.check_run_phase(event)?;
        self.check_open_entities(event)?;
        self.check_first_event(event)?;
        self.apply(event)
    }

    /// Terminal phases reject everything except what may follow them.
    fn check_run_phase(&mut self, event: &Event) -> Result<(), ProtocolError> {
        let ty = event.event_type();
        match self.state.phase {
            RunPhase::Errored => Err(violation(
                ty,
                format!(
                    "Cannot send event type '{ty}': The run has already errored with 'RUN_ERROR'. \
                     No further events can be sent."
                ),
            )),
            RunPhase::Finished => match event {
                Event::RunError(_) => Ok(()),
                Event::RunStarted(_) if self.config.allow_new_run_after_finish => {
                    debug!("new run started after RUN_FINISHED, resetting state");
                    self.state = VerifierState::default();
                    Ok(())
                }
                _ if self.config.allow_new_run_after_finish => Err(violation(
                    ty,
                    format!(
                        "Cannot send event type '{ty}': The run has already finished with \
                         'RUN_FINISHED'. Start a new run with 'RUN_STARTED'."
                    ),
                )),
                _ => Err(violation(
                    ty,
                    format!(
                        "Cannot send event type '{ty}': The run has already finished with \
                         'RUN_FINISHED'. No further events can be sent."
                    ),
                )),
            },
            RunPhase::Idle | RunPhase::Running => Ok(()),
        }
    }

    /// An open message, thinking message, or tool call admits only its own
    /// continuation events and `RAW`.
    fn check_open_entities(&self, event: &Event) -> Result<(), ProtocolError> {
        let ty = event.event_type();

        if let Some(id) = &self.state.active_message_id {
            match event {
                Event::TextMessageContent(_) | Event::TextMessageEnd(_) | Event::Raw(_) => {}
                Event::TextMessageStart(_) => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send 'TEXT_MESSAGE_START' event: A text message is already in \
                             progress ('{id}'). Complete it with 'TEXT_MESSAGE_END' first."
                        ),
                    ));
                }
                Event::ToolCallStart(_)
                | Event::ThinkingStart(_)
                | Event::ThinkingEnd(_)
                | Event::ThinkingTextMessageStart(_)
                | Event::ThinkingTextMessageContent(_)
                | Event::ThinkingTextMessageEnd(_) => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send '{ty}' event: Text message '{id}' is still open. \
                             Close it with 'TEXT_MESSAGE_END' first."
                        ),
                    ));
                }
                _ => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send event type '{ty}' after 'TEXT_MESSAGE_START': Text message \
                             '{id}' is still open. Send 'TEXT_MESSAGE_END' first."
                        ),
                    ));
                }
            }
        }

        if self.state.thinking_message {
            match event {
                Event::ThinkingTextMessageContent(_)
                | Event::ThinkingTextMessageEnd(_)
                | Event::Raw(_) => {}
                Event::ThinkingTextMessageStart(_) => {
                    return Err(violation(
                        ty,
                        "Cannot send 'THINKING_TEXT_MESSAGE_START' event: A thinking message is \
                         already in progress. Complete it with 'THINKING_TEXT_MESSAGE_END' first.",
                    ));
                }
                _ => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send event type '{ty}' after 'THINKING_TEXT_MESSAGE_START': \
                             Send 'THINKING_TEXT_MESSAGE_END' first."
                        ),
                    ));
                }
            }
        }

        if let Some(id) = &self.state.active_tool_call_id {
            match event {
                Event::ToolCallArgs(_) | Event::ToolCallEnd(_) | Event::Raw(_) => {}
                Event::ToolCallStart(_) => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send 'TOOL_CALL_START' event: A tool call is already in \
                             progress ('{id}'). Complete it with 'TOOL_CALL_END' first."
                        ),
                    ));
                }
                _ => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send event type '{ty}' after 'TOOL_CALL_START': Tool call \
                             '{id}' is still open. Send 'TOOL_CALL_END' first."
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    /// A run opens with `RUN_STARTED` (or fails immediately with
    /// `RUN_ERROR`) and has exactly one `RUN_STARTED`.
    fn check_first_event(&self, event: &Event) -> Result<(), ProtocolError> {
        let ty = event.event_type();
        match (self.state.phase, event) {
            (RunPhase::Idle, Event::RunStarted(_) | Event::RunError(_)) => Ok(()),
            (RunPhase::Idle, _) => Err(violation(
                ty,
                format!("First event must be 'RUN_STARTED', got '{ty}'."),
            )),
            (_, Event::RunStarted(_)) => Err(violation(
                ty,
                "Cannot send multiple 'RUN_STARTED' events: A 'RUN_STARTED' event was already \
                 sent. Each run must have exactly one 'RUN_STARTED' event at the beginning.",
            )),
            _ => Ok(()),
        }
    }

    fn apply(&mut self, event: &Event) -> Result<(), ProtocolError> {
        let ty = event.event_type();
        let state = &mut self.state;

        match event {
            Event::RunStarted(e) => {
                debug!(thread_id = %e.thread_id, run_id = %e.run_id, "run started");
                state.phase = RunPhase::Running;
            }

            Event::RunFinished(e) => {
                if !state.active_steps.is_empty() {
                    let unfinished = state
                        .active_steps
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send 'RUN_FINISHED' while steps are still active: {unfinished}."
                        ),
                    ));
                }
                if self.config.require_closed_entities {
                    let open = state.open_entities();
                    if !open.is_empty() {
                        return Err(violation(
                            ty,
                            format!(
                                "Cannot send 'RUN_FINISHED' while entities are still open: {}.",
                                open.join(", ")
                            ),
                        ));
                    }
                }
                debug!(thread_id = %e.thread_id, run_id = %e.run_id, "run finished");
                state.phase = RunPhase::Finished;
            }

            Event::RunError(e) => {
                debug!(message = %e.message, code = ?e.code, "run errored");
                state.phase = RunPhase::Errored;
            }

            Event::StepStarted(e) => {
                if state.active_steps.contains(&e.step_name) {
                    return Err(violation(
                        ty,
                        format!("Step '{}' is already active for 'STEP_STARTED'.", e.step_name),
                    ));
                }
                state.active_steps.insert(e.step_name.clone());
            }

            Event::StepFinished(e) => {
                if !state.active_steps.shift_remove(&e.step_name) {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send 'STEP_FINISHED' for step '{}' that was not started.",
                            e.step_name
                        ),
                    ));
                }
            }

            // Duplicate starts were already rejected by `check_open_entities`.
            Event::TextMessageStart(e) => {
                state.active_message_id = Some(e.message_id.clone());
            }

            Event::TextMessageContent(e) => match state.active_message_id.as_deref() {
                None => {
                    return Err(violation(
                        ty,
                        "Cannot send 'TEXT_MESSAGE_CONTENT' event: No active text message found. \
                         Start a text message with 'TEXT_MESSAGE_START' first.",
                    ));
                }
                Some(active) if active != e.message_id => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send 'TEXT_MESSAGE_CONTENT' event: Message ID mismatch. The ID \
                             '{}' doesn't match the active message ID '{active}'.",
                            e.message_id
                        ),
                    ));
                }
                Some(_) => {}
            },

            Event::TextMessageEnd(e) => {
                match state.active_message_id.as_deref() {
                    None => {
                        return Err(violation(
                            ty,
                            "Cannot send 'TEXT_MESSAGE_END' event: No active text message found. \
                             A 'TEXT_MESSAGE_START' event must be sent first.",
                        ));
                    }
                    Some(active) if active != e.message_id => {
                        return Err(violation(
                            ty,
                            format!(
                                "Cannot send 'TEXT_MESSAGE_END' event: Message ID mismatch. The ID \
                                 '{}' doesn't match the active message ID '{active}'.",
                                e.message_id
                            ),
                        ));
                    }
                    Some(_) => {}
                }
                state.active_message_id = None;
            }

            Event::ToolCallStart(e) => {
                trace!(
                    tool_call_id = %e.tool_call_id,
                    tool_call_name = %e.tool_call_name,
                    parent_message_id = ?e.parent_message_id,
                    "tool call started"
                );
                state.active_tool_call_id = Some(e.tool_call_id.clone());
            }

            Event::ToolCallArgs(e) => match state.active_tool_call_id.as_deref() {
                None => {
                    return Err(violation(
                        ty,
                        "Cannot send 'TOOL_CALL_ARGS' event: No active tool call found. Start a \
                         tool call with 'TOOL_CALL_START' first.",
                    ));
                }
                Some(active) if active != e.tool_call_id => {
                    return Err(violation(
                        ty,
                        format!(
                            "Cannot send 'TOOL_CALL_ARGS' event: Tool call ID mismatch. The ID \
                             '{}' doesn't match the active tool call ID '{active}'.",
                            e.tool_call_id
                        ),
                    ));
                }
                Some(_) => {}
            },

            Event::ToolCallEnd(e) => {
                match state.active_tool_call_id.as_deref() {
                    None => {
                        return Err(violation(
                            ty,
                            "Cannot send 'TOOL_CALL_END' event: No active tool call found. A \
                             'TOOL_CALL_START' event must be sent first.",
                        ));
                    }
                    Some(active) if active != e.tool_call_id => {
                        return Err(violation(
                            ty,
                            format!(
                                "Cannot send 'TOOL_CALL_END' event: Tool call ID mismatch. The ID \
                                 '{}' doesn't match the active tool call ID '{active}'.",
                                e.tool_call_id
                            ),
                        ));
                    }
                    Some(_) => {}
                }
                state.active_tool_call_id = None;
            }

            Event::ThinkingStart(_) => {
                if state.thinking_step {
                    return Err(violation(
                        ty,
                        "Cannot send 'THINKING_START' event: A thinking step is already in \
                         progress. End it with 'THINKING_END' first.",
                    ));
                }
                state.thinking_step = true;
            }

            Event::ThinkingEnd(_) => {
                if !state.thinking_step {
                    return Err(violation(
                        ty,
                        "Cannot send 'THINKING_END' event: No active thinking step found. A \
                         'THINKING_START' event must be sent first.",
                    ));
                }
                state.thinking_step = false;
            }

            Event::ThinkingTextMessageStart(_) => {
                if !state.thinking_step {
                    return Err(violation(
                        ty,
                        "Cannot send 'THINKING_TEXT_MESSAGE_START' event: A thinking step is not \
                         in progress. Create one with 'THINKING_START' first.",
                    ));
                }
                state.thinking_message = true;
            }

            Event::ThinkingTextMessageContent(_) => {
                if !state.thinking_message {
                    return Err(violation(
                        ty,
                        "Cannot send 'THINKING_TEXT_MESSAGE_CONTENT' event: No active thinking \
                         message found. Start a message with 'THINKING_TEXT_MESSAGE_START' first.",
                    ));
                }
            }

            Event::ThinkingTextMessageEnd(_) => {
                if !state.thinking_message {
                    return Err(violation(
                        ty,
                        "Cannot send 'THINKING_TEXT_MESSAGE_END' event: No active thinking message \
                         found. A 'THINKING_TEXT_MESSAGE_START' event must be sent first.",
                    ));
                }
                state.thinking_message = false;
            }

            // Chunks are expanded upstream; unconstrained here.
            Event::TextMessageChunk(_)
            | Event::ToolCallChunk(_)
            | Event::ToolCallResult(_)
            | Event::StateSnapshot(_)
            | Event::StateDelta(_)
            | Event::MessagesSnapshot(_)
            | Event::Raw(_)
            | Event::Custom(_) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_ui_core::*;
    use std::result::Result;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn run_started() -> Event {
        RunStartedEvent::new("thread-1", "run-1").into()
    }

    fn run_finished() -> Event {
        RunFinishedEvent::new("thread-1", "run-1").into()
    }

    /// Feed events until the first failure, returning its index and error.
    fn feed(verifier: &mut EventVerifier, events: Vec<Event>) -> Result<(), (usize, ProtocolError)> {
        for (i, event) in events.into_iter().enumerate() {
            verifier.verify(event).map_err(|e| (i, e))?;
        }
        Ok(())
    }

    fn expect_failure_at(events: Vec<Event>, index: usize) -> ProtocolError {
        let mut verifier = EventVerifier::new();
        let (at, err) = feed(&mut verifier, events).expect_err("sequence should be rejected");
        assert_eq!(at, index, "failed at unexpected event: {err}");
        err
    }

    #[test]
    fn test_well_formed_run_is_accepted() {
        let events: Vec<Event> = vec![
            run_started(),
            StepStartedEvent::new("plan").into(),
            StepFinishedEvent::new("plan").into(),
            TextMessageStartEvent::new("m1").into(),
            TextMessageContentEvent::new("m1", "Hello").into(),
            TextMessageContentEvent::new("m1", " world").into(),
            TextMessageEndEvent::new("m1").into(),
            TextMessageStartEvent::new("m2").into(),
            TextMessageEndEvent::new("m2").into(),
            ToolCallStartEvent::new("t1", "search").with_parent_message_id("m2").into(),
            ToolCallArgsEvent::new("t1", r#"{"q":"#).into(),
            ToolCallArgsEvent::new("t1", r#""rust"}"#).into(),
            ToolCallEndEvent::new("t1").into(),
            ToolCallResultEvent::new("m3", "t1", "found").into(),
            StateSnapshotEvent::new(json!({"count": 1})).into(),
            StateDeltaEvent::new(vec![json!({"op": "replace", "path": "/count", "value": 2})]).into(),
            MessagesSnapshotEvent::new(vec![]).into(),
            CustomEvent::new("progress", json!(50)).into(),
            run_finished(),
        ];

        let mut verifier = EventVerifier::new();
        assert_eq!(feed(&mut verifier, events), Ok(()));
        assert_eq!(verifier.phase(), RunPhase::Finished);
        assert!(verifier.is_run_complete());
    }

    #[test]
    fn test_thinking_sequence_is_accepted() {
        let events: Vec<Event> = vec![
            run_started(),
            ThinkingStartEvent::new().with_title("reasoning").into(),
            ThinkingTextMessageStartEvent::new().into(),
            ThinkingTextMessageContentEvent::new("Let me think...").into(),
            ThinkingTextMessageEndEvent::new().into(),
            ThinkingEndEvent::new().into(),
            run_finished(),
        ];
        let mut verifier = EventVerifier::new();
        assert_eq!(feed(&mut verifier, events), Ok(()));
    }

    #[test]
    fn test_raw_allowed_inside_open_entities() {
        let events: Vec<Event> = vec![
            run_started(),
            TextMessageStartEvent::new("m1").into(),
            RawEvent::new(json!({"x": 1})).into(),
            TextMessageEndEvent::new("m1").into(),
            ToolCallStartEvent::new("t1", "fn").into(),
            RawEvent::new(json!({"x": 2})).into(),
            ToolCallEndEvent::new("t1").into(),
            ThinkingStartEvent::new().into(),
            ThinkingTextMessageStartEvent::new().into(),
            RawEvent::new(json!({"x": 3})).into(),
            ThinkingTextMessageEndEvent::new().into(),
            ThinkingEndEvent::new().into(),
            run_finished(),
        ];
        let mut verifier = EventVerifier::new();
        assert_eq!(feed(&mut verifier, events), Ok(()));
    }

    #[rstest]
    #[case::text_message(
        vec![TextMessageStartEvent::new("m1").into(), TextMessageStartEvent::new("m2").into()],
        "A text message is already in progress"
    )]
    #[case::same_text_message(
        vec![TextMessageStartEvent::new("m1").into(), TextMessageStartEvent::new("m1").into()],
        "A text message is already in progress"
    )]
    #[case::tool_call(
        vec![ToolCallStartEvent::new("t1", "a").into(), ToolCallStartEvent::new("t2", "b").into()],
        "A tool call is already in progress"
    )]
    #[case::step(
        vec![StepStartedEvent::new("plan").into(), StepStartedEvent::new("plan").into()],
        "Step 'plan' is already active"
    )]
    #[case::thinking_step(
        vec![ThinkingStartEvent::new().into(), ThinkingStartEvent::new().into()],
        "A thinking step is already in progress"
    )]
    #[case::thinking_message(
        vec![
            ThinkingStartEvent::new().into(),
            ThinkingTextMessageStartEvent::new().into(),
            ThinkingTextMessageStartEvent::new().into(),
        ],
        "A thinking message is already in progress"
    )]
    fn test_duplicate_start_rejected(#[case] body: Vec<Event>, #[case] expected: &str) {
        let last = body.len();
        let mut events = vec![run_started()];
        events.extend(body);
        let err = expect_failure_at(events, last);
        assert!(err.message.contains(expected), "{}", err.message);
    }

    #[rstest]
    #[case(TextMessageContentEvent::new("m1", "x").into(), "No active text message")]
    #[case(TextMessageEndEvent::new("m1").into(), "No active text message")]
    #[case(ToolCallArgsEvent::new("t1", "{}").into(), "No active tool call")]
    #[case(ToolCallEndEvent::new("t1").into(), "No active tool call")]
    #[case(ThinkingTextMessageContentEvent::new("x").into(), "No active thinking message")]
    #[case(ThinkingTextMessageEndEvent::new().into(), "No active thinking message")]
    #[case(ThinkingEndEvent::new().into(), "No active thinking step")]
    #[case(StepFinishedEvent::new("plan").into(), "was not started")]
    fn test_orphan_event_rejected(#[case] orphan: Event, #[case] expected: &str) {
        let ty = orphan.event_type();
        let err = expect_failure_at(vec![run_started(), orphan], 1);
        assert_eq!(err.event_type, ty);
        assert!(err.message.contains(expected), "{}", err.message);
    }

    #[test]
    fn test_thinking_message_requires_thinking_step() {
        let err = expect_failure_at(
            vec![run_started(), ThinkingTextMessageStartEvent::new().into()],
            1,
        );
        assert!(err.message.contains("A thinking step is not in progress"));
    }

    #[rstest]
    #[case(
        TextMessageStartEvent::new("m1").into(),
        TextMessageContentEvent::new("m2", "x").into(),
        "The ID 'm2' doesn't match the active message ID 'm1'"
    )]
    #[case(
        TextMessageStartEvent::new("m1").into(),
        TextMessageEndEvent::new("m2").into(),
        "The ID 'm2' doesn't match the active message ID 'm1'"
    )]
    #[case(
        ToolCallStartEvent::new("t1", "fn").into(),
        ToolCallArgsEvent::new("t2", "{}").into(),
        "The ID 't2' doesn't match the active tool call ID 't1'"
    )]
    #[case(
        ToolCallStartEvent::new("t1", "fn").into(),
        ToolCallEndEvent::new("t2").into(),
        "The ID 't2' doesn't match the active tool call ID 't1'"
    )]
    fn test_id_mismatch_rejected(#[case] start: Event, #[case] wrong: Event, #[case] expected: &str) {
        let err = expect_failure_at(vec![run_started(), start, wrong], 2);
        assert!(err.message.contains("mismatch"), "{}", err.message);
        assert!(err.message.contains(expected), "{}", err.message);
    }

    #[test]
    fn test_run_error_is_sticky() {
        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        verifier.verify(RunErrorEvent::new("model exploded").into()).unwrap();
        assert_eq!(verifier.phase(), RunPhase::Errored);

        for event in [
            run_started(),
            RunErrorEvent::new("again").into(),
            RawEvent::new(json!(null)).into(),
            TextMessageStartEvent::new("m1").into(),
        ] {
            let err = verifier.verify(event).unwrap_err();
            assert!(err.message.contains("already errored"), "{}", err.message);
            assert!(err.message.contains("No further events can be sent"));
        }
    }

    #[test]
    fn test_run_finished_is_sticky() {
        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        verifier.verify(run_finished()).unwrap();

        for event in [
            TextMessageStartEvent::new("m1").into(),
            RawEvent::new(json!(null)).into(),
            run_finished(),
        ] {
            let err = verifier.verify(event).unwrap_err();
            assert!(err.message.contains("already finished"), "{}", err.message);
        }
        assert_eq!(verifier.phase(), RunPhase::Finished);
    }

    #[test]
    fn test_run_error_after_finish_is_accepted() {
        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        verifier.verify(run_finished()).unwrap();
        verifier.verify(RunErrorEvent::new("late failure").into()).unwrap();
        assert_eq!(verifier.phase(), RunPhase::Errored);
    }

    #[test]
    fn test_new_run_after_finish_resets_state() {
        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        verifier.verify(run_finished()).unwrap();

        verifier.verify(RunStartedEvent::new("thread-1", "run-2").into()).unwrap();
        assert_eq!(verifier.phase(), RunPhase::Running);
        verifier.verify(TextMessageStartEvent::new("m1").into()).unwrap();
        assert_eq!(verifier.state().active_message_id(), Some("m1"));
    }

    #[test]
    fn test_new_run_after_finish_can_be_disabled() {
        let config = VerifierConfig::new().allow_new_run_after_finish(false);
        let mut verifier = EventVerifier::with_config(config);
        verifier.verify(run_started()).unwrap();
        verifier.verify(run_finished()).unwrap();

        let err = verifier.verify(run_started()).unwrap_err();
        assert!(err.message.contains("already finished"));
        assert!(err.message.contains("No further events can be sent"));
    }

    #[rstest]
    #[case(TextMessageStartEvent::new("m1").into())]
    #[case(StepStartedEvent::new("plan").into())]
    #[case(RawEvent::new(json!(null)).into())]
    #[case(run_finished())]
    fn test_first_event_must_be_run_started(#[case] first: Event) {
        let err = expect_failure_at(vec![first], 0);
        assert!(err.message.contains("First event must be 'RUN_STARTED'"), "{}", err.message);
    }

    #[test]
    fn test_run_error_may_be_first() {
        let mut verifier = EventVerifier::new();
        verifier.verify(RunErrorEvent::new("could not start").into()).unwrap();
        assert_eq!(verifier.phase(), RunPhase::Errored);
    }

    #[test]
    fn test_rejected_first_event_leaves_verifier_idle() {
        let mut verifier = EventVerifier::new();
        assert!(verifier.verify(TextMessageStartEvent::new("m1").into()).is_err());
        assert_eq!(verifier.phase(), RunPhase::Idle);
        verifier.verify(run_started()).unwrap();
    }

    #[test]
    fn test_second_run_started_rejected() {
        let err = expect_failure_at(vec![run_started(), run_started()], 1);
        assert!(err.message.contains("Cannot send multiple 'RUN_STARTED' events"));
    }

    #[test]
    fn test_open_text_message_blocks_other_events() {
        let err = expect_failure_at(
            vec![
                run_started(),
                TextMessageStartEvent::new("m1").into(),
                StepStartedEvent::new("plan").into(),
            ],
            2,
        );
        assert_eq!(
            err.message,
            "Cannot send event type 'STEP_STARTED' after 'TEXT_MESSAGE_START': Text message 'm1' \
             is still open. Send 'TEXT_MESSAGE_END' first."
        );
    }

    #[rstest]
    #[case(ToolCallStartEvent::new("t1", "fn").into())]
    #[case(ThinkingStartEvent::new().into())]
    fn test_open_text_message_calls_out_close_first(#[case] event: Event) {
        let ty = event.event_type();
        let err = expect_failure_at(
            vec![run_started(), TextMessageStartEvent::new("m1").into(), event],
            2,
        );
        assert_eq!(
            err.message,
            format!(
                "Cannot send '{ty}' event: Text message 'm1' is still open. Close it with \
                 'TEXT_MESSAGE_END' first."
            )
        );
    }

    #[test]
    fn test_open_thinking_message_blocks_other_events() {
        let err = expect_failure_at(
            vec![
                run_started(),
                ThinkingStartEvent::new().into(),
                ThinkingTextMessageStartEvent::new().into(),
                ThinkingEndEvent::new().into(),
            ],
            3,
        );
        assert!(err.message.contains("Send 'THINKING_TEXT_MESSAGE_END' first"));
    }

    #[test]
    fn test_open_tool_call_blocks_other_events() {
        let err = expect_failure_at(
            vec![
                run_started(),
                ToolCallStartEvent::new("t1", "fn").into(),
                TextMessageStartEvent::new("m1").into(),
            ],
            2,
        );
        assert_eq!(
            err.message,
            "Cannot send event type 'TEXT_MESSAGE_START' after 'TOOL_CALL_START': Tool call 't1' \
             is still open. Send 'TOOL_CALL_END' first."
        );
    }

    #[test]
    fn test_run_finished_with_open_tool_call_names_it() {
        let err = expect_failure_at(
            vec![
                run_started(),
                TextMessageStartEvent::new("m1").into(),
                TextMessageContentEvent::new("m1", "Hi").into(),
                TextMessageEndEvent::new("m1").into(),
                ToolCallStartEvent::new("t1", "fn").into(),
                run_finished(),
            ],
            5,
        );
        assert_eq!(err.event_type, EventType::RunFinished);
        assert!(err.message.contains("'t1'"), "{}", err.message);
    }

    #[test]
    fn test_run_finished_with_active_steps_lists_them_in_order() {
        let err = expect_failure_at(
            vec![
                run_started(),
                StepStartedEvent::new("b").into(),
                StepStartedEvent::new("a").into(),
                StepStartedEvent::new("c").into(),
                StepFinishedEvent::new("a").into(),
                run_finished(),
            ],
            5,
        );
        assert_eq!(
            err.message,
            "Cannot send 'RUN_FINISHED' while steps are still active: b, c."
        );
    }

    #[test]
    fn test_run_finished_with_open_thinking_step() {
        let events: Vec<Event> = vec![run_started(), ThinkingStartEvent::new().into(), run_finished()];

        let err = expect_failure_at(events.clone(), 2);
        assert_eq!(
            err.message,
            "Cannot send 'RUN_FINISHED' while entities are still open: thinking step."
        );

        let config = VerifierConfig::new().require_closed_entities(false);
        let mut lenient = EventVerifier::with_config(config);
        assert_eq!(feed(&mut lenient, events), Ok(()));
    }

    #[test]
    fn test_steps_can_interleave_and_reopen() {
        let events: Vec<Event> = vec![
            run_started(),
            StepStartedEvent::new("a").into(),
            StepStartedEvent::new("b").into(),
            StepFinishedEvent::new("a").into(),
            StepStartedEvent::new("a").into(),
            StepFinishedEvent::new("b").into(),
            StepFinishedEvent::new("a").into(),
            run_finished(),
        ];
        let mut verifier = EventVerifier::new();
        assert_eq!(feed(&mut verifier, events), Ok(()));
    }

    #[test]
    fn test_rejected_event_leaves_state_untouched() {
        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        verifier.verify(StepStartedEvent::new("plan").into()).unwrap();
        verifier.verify(TextMessageStartEvent::new("m1").into()).unwrap();
        let before = verifier.state().clone();

        assert!(verifier.verify(TextMessageEndEvent::new("m2").into()).is_err());
        assert_eq!(verifier.state(), &before);
        assert!(verifier.verify(run_finished()).is_err());
        assert_eq!(verifier.state(), &before);
    }

    #[test]
    fn test_state_accessors_track_active_entities() {
        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        verifier.verify(StepStartedEvent::new("plan").into()).unwrap();
        verifier.verify(ThinkingStartEvent::new().into()).unwrap();
        verifier.verify(ThinkingTextMessageStartEvent::new().into()).unwrap();

        let state = verifier.state();
        assert_eq!(state.active_steps().collect::<Vec<_>>(), vec!["plan"]);
        assert!(state.is_thinking());
        assert!(state.is_thinking_message_active());
        assert_eq!(state.active_message_id(), None);
        assert_eq!(state.active_tool_call_id(), None);

        verifier.reset();
        assert_eq!(verifier.state(), &VerifierState::default());
    }

    #[test]
    fn test_passthrough_events_do_not_change_state() {
        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        let before = verifier.state().clone();
        for event in [
            Event::from(ToolCallResultEvent::new("m1", "t1", "ok")),
            StateSnapshotEvent::new(json!({})).into(),
            CustomEvent::new("ping", json!(true)).into(),
            TextMessageChunkEvent::new().with_message_id("m1").into(),
        ] {
            verifier.verify(event).unwrap();
        }
        assert_eq!(verifier.state(), &before);
    }

    #[test]
    fn test_payload_validation_is_opt_in() {
        let empty_delta: Event = TextMessageContentEvent::new("m1", "").into();

        let mut verifier = EventVerifier::new();
        verifier.verify(run_started()).unwrap();
        verifier.verify(TextMessageStartEvent::new("m1").into()).unwrap();
        verifier.verify(empty_delta.clone()).unwrap();

        let mut strict = EventVerifier::with_config(VerifierConfig::new().validate_payloads(true));
        strict.verify(run_started()).unwrap();
        strict.verify(TextMessageStartEvent::new("m1").into()).unwrap();
        let err = strict.verify(empty_delta).unwrap_err();
        assert!(err.message.contains("delta must not be empty"));
    }

    #[test]
    fn test_verify_returns_event_unchanged() {
        let mut verifier = EventVerifier::new();
        let event = run_started();
        assert_eq!(verifier.verify(event.clone()).unwrap(), event);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: VerifierConfig =
            serde_json::from_str(r#"{"validate_payloads": true}"#).unwrap();
        assert!(config.validate_payloads);
        assert!(config.require_closed_entities);
        assert!(config.allow_new_run_after_finish);
    }
}
