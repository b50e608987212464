//! AG-UI protocol events.
//!
//! Agent-User Interaction protocol events, modeled as the closed [`Event`]
//! enum. On the wire an event is a JSON object discriminated by its `type`
//! field:
//!
//! ```json
//! {"type":"TEXT_MESSAGE_CONTENT","messageId":"msg-1","delta":"Hello"}
//! ```
//!
//! Events are organized into categories:
//! - **Run lifecycle**: `RUN_STARTED`, `RUN_FINISHED`, `RUN_ERROR`
//! - **Steps**: `STEP_STARTED`, `STEP_FINISHED`
//! - **Text messages**: `TEXT_MESSAGE_START`, `TEXT_MESSAGE_CONTENT`, `TEXT_MESSAGE_END`, `TEXT_MESSAGE_CHUNK`
//! - **Thinking**: `THINKING_START`, `THINKING_END` with nested text messages
//! - **Tool calls**: `TOOL_CALL_START`, `TOOL_CALL_ARGS`, `TOOL_CALL_END`, `TOOL_CALL_CHUNK`, `TOOL_CALL_RESULT`
//! - **State**: `STATE_SNAPSHOT`, `STATE_DELTA`, `MESSAGES_SNAPSHOT`
//! - **Escape hatches**: `RAW`, `CUSTOM`

use crate::errors::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Implements the shared builders and the `From` conversion into [`Event`]
/// for each payload struct.
macro_rules! impl_event_payload {
    ($($variant:ident => $payload:ident),* $(,)?) => {
        $(
            impl $payload {
                /// Set the timestamp (milliseconds since epoch).
                pub fn with_timestamp(mut self, timestamp: Option<i64>) -> Self {
                    self.timestamp = timestamp;
                    self
                }

                /// Attach the source event for debugging.
                pub fn with_raw_event(mut self, raw_event: Value) -> Self {
                    self.raw_event = Some(raw_event);
                    self
                }
            }

            impl From<$payload> for Event {
                fn from(event: $payload) -> Self {
                    Event::$variant(event)
                }
            }
        )*
    };
}

/// Runs `$body` with `$inner` bound to the payload of any event variant.
macro_rules! with_payload {
    ($event:expr, $inner:ident => $body:expr) => {
        match $event {
            Event::RunStarted($inner) => $body,
            Event::RunFinished($inner) => $body,
            Event::RunError($inner) => $body,
            Event::StepStarted($inner) => $body,
            Event::StepFinished($inner) => $body,
            Event::TextMessageStart($inner) => $body,
            Event::TextMessageContent($inner) => $body,
            Event::TextMessageEnd($inner) => $body,
            Event::TextMessageChunk($inner) => $body,
            Event::ThinkingStart($inner) => $body,
            Event::ThinkingEnd($inner) => $body,
            Event::ThinkingTextMessageStart($inner) => $body,
            Event::ThinkingTextMessageContent($inner) => $body,
            Event::ThinkingTextMessageEnd($inner) => $body,
            Event::ToolCallStart($inner) => $body,
            Event::ToolCallArgs($inner) => $body,
            Event::ToolCallEnd($inner) => $body,
            Event::ToolCallChunk($inner) => $body,
            Event::ToolCallResult($inner) => $body,
            Event::StateSnapshot($inner) => $body,
            Event::StateDelta($inner) => $body,
            Event::MessagesSnapshot($inner) => $body,
            Event::Raw($inner) => $body,
            Event::Custom($inner) => $body,
        }
    };
}

mod types;

pub use types::*;

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Developer instructions.
    Developer,
    /// System prompt.
    System,
    /// The agent.
    #[default]
    Assistant,
    /// The end user.
    User,
    /// A tool result.
    Tool,
}

/// Event type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Run has started.
    RunStarted,
    /// Run has finished successfully.
    RunFinished,
    /// Run encountered an error.
    RunError,
    /// Step started.
    StepStarted,
    /// Step finished.
    StepFinished,
    /// Text message started.
    TextMessageStart,
    /// Text message content delta.
    TextMessageContent,
    /// Text message ended.
    TextMessageEnd,
    /// Text message chunk (implicit start plus optional delta).
    TextMessageChunk,
    /// Thinking/reasoning started.
    ThinkingStart,
    /// Thinking/reasoning ended.
    ThinkingEnd,
    /// Thinking text message started (nested in thinking).
    ThinkingTextMessageStart,
    /// Thinking text message content delta.
    ThinkingTextMessageContent,
    /// Thinking text message ended.
    ThinkingTextMessageEnd,
    /// Tool call started.
    ToolCallStart,
    /// Tool call arguments delta.
    ToolCallArgs,
    /// Tool call ended (arguments complete).
    ToolCallEnd,
    /// Tool call chunk (implicit start plus optional args delta).
    ToolCallChunk,
    /// Tool call result received.
    ToolCallResult,
    /// State snapshot (full state).
    StateSnapshot,
    /// State delta (partial update).
    StateDelta,
    /// Messages snapshot.
    MessagesSnapshot,
    /// Raw event (passthrough).
    Raw,
    /// Custom event.
    Custom,
}

impl EventType {
    /// The wire name of this event type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunStarted => "RUN_STARTED",
            Self::RunFinished => "RUN_FINISHED",
            Self::RunError => "RUN_ERROR",
            Self::StepStarted => "STEP_STARTED",
            Self::StepFinished => "STEP_FINISHED",
            Self::TextMessageStart => "TEXT_MESSAGE_START",
            Self::TextMessageContent => "TEXT_MESSAGE_CONTENT",
            Self::TextMessageEnd => "TEXT_MESSAGE_END",
            Self::TextMessageChunk => "TEXT_MESSAGE_CHUNK",
            Self::ThinkingStart => "THINKING_START",
            Self::ThinkingEnd => "THINKING_END",
            Self::ThinkingTextMessageStart => "THINKING_TEXT_MESSAGE_START",
            Self::ThinkingTextMessageContent => "THINKING_TEXT_MESSAGE_CONTENT",
            Self::ThinkingTextMessageEnd => "THINKING_TEXT_MESSAGE_END",
            Self::ToolCallStart => "TOOL_CALL_START",
            Self::ToolCallArgs => "TOOL_CALL_ARGS",
            Self::ToolCallEnd => "TOOL_CALL_END",
            Self::ToolCallChunk => "TOOL_CALL_CHUNK",
            Self::ToolCallResult => "TOOL_CALL_RESULT",
            Self::StateSnapshot => "STATE_SNAPSHOT",
            Self::StateDelta => "STATE_DELTA",
            Self::MessagesSnapshot => "MESSAGES_SNAPSHOT",
            Self::Raw => "RAW",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single AG-UI protocol event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// See [`RunStartedEvent`].
    RunStarted(RunStartedEvent),
    /// See [`RunFinishedEvent`].
    RunFinished(RunFinishedEvent),
    /// See [`RunErrorEvent`].
    RunError(RunErrorEvent),
    /// See [`StepStartedEvent`].
    StepStarted(StepStartedEvent),
    /// See [`StepFinishedEvent`].
    StepFinished(StepFinishedEvent),
    /// See [`TextMessageStartEvent`].
    TextMessageStart(TextMessageStartEvent),
    /// See [`TextMessageContentEvent`].
    TextMessageContent(TextMessageContentEvent),
    /// See [`TextMessageEndEvent`].
    TextMessageEnd(TextMessageEndEvent),
    /// See [`TextMessageChunkEvent`].
    TextMessageChunk(TextMessageChunkEvent),
    /// See [`ThinkingStartEvent`].
    ThinkingStart(ThinkingStartEvent),
    /// See [`ThinkingEndEvent`].
    ThinkingEnd(ThinkingEndEvent),
    /// See [`ThinkingTextMessageStartEvent`].
    ThinkingTextMessageStart(ThinkingTextMessageStartEvent),
    /// See [`ThinkingTextMessageContentEvent`].
    ThinkingTextMessageContent(ThinkingTextMessageContentEvent),
    /// See [`ThinkingTextMessageEndEvent`].
    ThinkingTextMessageEnd(ThinkingTextMessageEndEvent),
    /// See [`ToolCallStartEvent`].
    ToolCallStart(ToolCallStartEvent),
    /// See [`ToolCallArgsEvent`].
    ToolCallArgs(ToolCallArgsEvent),
    /// See [`ToolCallEndEvent`].
    ToolCallEnd(ToolCallEndEvent),
    /// See [`ToolCallChunkEvent`].
    ToolCallChunk(ToolCallChunkEvent),
    /// See [`ToolCallResultEvent`].
    ToolCallResult(ToolCallResultEvent),
    /// See [`StateSnapshotEvent`].
    StateSnapshot(StateSnapshotEvent),
    /// See [`StateDeltaEvent`].
    StateDelta(StateDeltaEvent),
    /// See [`MessagesSnapshotEvent`].
    MessagesSnapshot(MessagesSnapshotEvent),
    /// See [`RawEvent`].
    Raw(RawEvent),
    /// See [`CustomEvent`].
    Custom(CustomEvent),
}

impl Event {
    /// Get the event type.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::RunStarted(_) => EventType::RunStarted,
            Self::RunFinished(_) => EventType::RunFinished,
            Self::RunError(_) => EventType::RunError,
            Self::StepStarted(_) => EventType::StepStarted,
            Self::StepFinished(_) => EventType::StepFinished,
            Self::TextMessageStart(_) => EventType::TextMessageStart,
            Self::TextMessageContent(_) => EventType::TextMessageContent,
            Self::TextMessageEnd(_) => EventType::TextMessageEnd,
            Self::TextMessageChunk(_) => EventType::TextMessageChunk,
            Self::ThinkingStart(_) => EventType::ThinkingStart,
            Self::ThinkingEnd(_) => EventType::ThinkingEnd,
            Self::ThinkingTextMessageStart(_) => EventType::ThinkingTextMessageStart,
            Self::ThinkingTextMessageContent(_) => EventType::ThinkingTextMessageContent,
            Self::ThinkingTextMessageEnd(_) => EventType::ThinkingTextMessageEnd,
            Self::ToolCallStart(_) => EventType::ToolCallStart,
            Self::ToolCallArgs(_) => EventType::ToolCallArgs,
            Self::ToolCallEnd(_) => EventType::ToolCallEnd,
            Self::ToolCallChunk(_) => EventType::ToolCallChunk,
            Self::ToolCallResult(_) => EventType::ToolCallResult,
            Self::StateSnapshot(_) => EventType::StateSnapshot,
            Self::StateDelta(_) => EventType::StateDelta,
            Self::MessagesSnapshot(_) => EventType::MessagesSnapshot,
            Self::Raw(_) => EventType::Raw,
            Self::Custom(_) => EventType::Custom,
        }
    }

    /// Get the timestamp (milliseconds since epoch).
    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        with_payload!(self, e => e.timestamp)
    }

    /// Get the raw source event, if attached.
    #[must_use]
    pub fn raw_event(&self) -> Option<&Value> {
        with_payload!(self, e => e.raw_event.as_ref())
    }

    /// Whether this is a chunk event that needs expanding.
    #[must_use]
    pub fn is_chunk(&self) -> bool {
        matches!(self, Self::TextMessageChunk(_) | Self::ToolCallChunk(_))
    }

    /// Whether this event ends a run.
    #[must_use]
    pub fn is_run_terminal(&self) -> bool {
        matches!(self, Self::RunFinished(_) | Self::RunError(_))
    }

    /// Encode the event as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an event from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the event's own fields, independent of stream state.
    ///
    /// Identifiers must be non-empty, content deltas must be non-empty, and
    /// a chunk must carry at least one field.
    pub fn validate(&self) -> std::result::Result<(), ProtocolError> {
        let ty = self.event_type();
        let required = |field: &str, value: &str| {
            if value.is_empty() {
                Err(ProtocolError::new(
                    ty,
                    format!("Invalid '{ty}' event: {field} must not be empty."),
                ))
            } else {
                Ok(())
            }
        };

        match self {
            Self::RunStarted(e) => {
                required("threadId", &e.thread_id)?;
                required("runId", &e.run_id)
            }
            Self::RunFinished(e) => {
                required("threadId", &e.thread_id)?;
                required("runId", &e.run_id)
            }
            Self::RunError(e) => required("message", &e.message),
            Self::StepStarted(e) => required("stepName", &e.step_name),
            Self::StepFinished(e) => required("stepName", &e.step_name),
            Self::TextMessageStart(e) => required("messageId", &e.message_id),
            Self::TextMessageContent(e) => {
                required("messageId", &e.message_id)?;
                required("delta", &e.delta)
            }
            Self::TextMessageEnd(e) => required("messageId", &e.message_id),
            Self::TextMessageChunk(e) => {
                if e.message_id.is_none() && e.delta.is_none() {
                    return Err(ProtocolError::new(
                        ty,
                        format!("Invalid '{ty}' event: at least one of messageId or delta must be present."),
                    ));
                }
                Ok(())
            }
            Self::ThinkingTextMessageContent(e) => required("delta", &e.delta),
            Self::ToolCallStart(e) => {
                required("toolCallId", &e.tool_call_id)?;
                required("toolCallName", &e.tool_call_name)
            }
            Self::ToolCallArgs(e) => {
                required("toolCallId", &e.tool_call_id)?;
                required("delta", &e.delta)
            }
            Self::ToolCallEnd(e) => required("toolCallId", &e.tool_call_id),
            Self::ToolCallChunk(e) => {
                if e.tool_call_id.is_none() && e.tool_call_name.is_none() && e.delta.is_none() {
                    return Err(ProtocolError::new(
                        ty,
                        format!(
                            "Invalid '{ty}' event: at least one of toolCallId, toolCallName, or delta must be present."
                        ),
                    ));
                }
                Ok(())
            }
            Self::ToolCallResult(e) => {
                required("messageId", &e.message_id)?;
                required("toolCallId", &e.tool_call_id)
            }
            Self::Custom(e) => required("name", &e.name),
            Self::ThinkingStart(_)
            | Self::ThinkingEnd(_)
            | Self::ThinkingTextMessageStart(_)
            | Self::ThinkingTextMessageEnd(_)
            | Self::StateSnapshot(_)
            | Self::StateDelta(_)
            | Self::MessagesSnapshot(_)
            | Self::Raw(_) => Ok(()),
        }
    }
}
