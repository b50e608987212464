//! AG-UI event payloads.
//!
//! One struct per event type. Every payload carries the common fields:
//! - `timestamp`: Optional Unix timestamp in milliseconds
//! - `rawEvent`: Optional opaque passthrough of the source event
//!
//! Constructors stamp the current time; builder methods fill optional fields.

use super::{now_millis, Event, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Run Lifecycle Events
// ============================================================================

/// Run started event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStartedEvent {
    /// Thread identifier.
    pub thread_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl RunStartedEvent {
    /// Create a new run started event.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Run finished event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFinishedEvent {
    /// Thread identifier.
    pub thread_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Final result of the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl RunFinishedEvent {
    /// Create a new run finished event.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            result: None,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }

    /// Set the run result.
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}

/// Run error event.
///
/// The optional `code` is an application-level error code, unrelated to
/// protocol violations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunErrorEvent {
    /// Error message.
    pub message: String,
    /// Error code (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl RunErrorEvent {
    /// Create a new run error event.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

// ============================================================================
// Step Lifecycle Events
// ============================================================================

/// Step started event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStartedEvent {
    /// Step name, unique among active steps.
    pub step_name: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl StepStartedEvent {
    /// Create a new step started event.
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Step finished event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFinishedEvent {
    /// Step name.
    pub step_name: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl StepFinishedEvent {
    /// Create a new step finished event.
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

// ============================================================================
// Text Message Events
// ============================================================================

/// Text message start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageStartEvent {
    /// Message identifier.
    pub message_id: String,
    /// Role of the message sender.
    #[serde(default)]
    pub role: Role,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl TextMessageStartEvent {
    /// Create a new text message start event.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            role: Role::Assistant,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Text message content event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageContentEvent {
    /// Message identifier.
    pub message_id: String,
    /// Content delta.
    pub delta: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl TextMessageContentEvent {
    /// Create a new text message content event.
    pub fn new(message_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            delta: delta.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Text message end event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageEndEvent {
    /// Message identifier.
    pub message_id: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl TextMessageEndEvent {
    /// Create a new text message end event.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Text message chunk event.
///
/// Bundles "start if needed" and an optional content delta. The chunk
/// transformer expands it into start/content/end events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageChunkEvent {
    /// Message identifier; required on the chunk that opens a message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Role of the message sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Content delta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl TextMessageChunkEvent {
    /// Create an empty text message chunk.
    pub fn new() -> Self {
        Self {
            timestamp: Some(now_millis()),
            ..Self::default()
        }
    }

    /// Set the message ID.
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the content delta.
    pub fn with_delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = Some(delta.into());
        self
    }
}

// ============================================================================
// Thinking Events
// ============================================================================

/// Thinking start event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingStartEvent {
    /// Optional title for the thinking step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ThinkingStartEvent {
    /// Create a new thinking start event.
    pub fn new() -> Self {
        Self {
            timestamp: Some(now_millis()),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Thinking end event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingEndEvent {
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ThinkingEndEvent {
    /// Create a new thinking end event.
    pub fn new() -> Self {
        Self {
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Thinking text message start event (nested within thinking).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingTextMessageStartEvent {
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ThinkingTextMessageStartEvent {
    /// Create a new thinking text message start event.
    pub fn new() -> Self {
        Self {
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Thinking text message content event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingTextMessageContentEvent {
    /// Content delta.
    pub delta: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ThinkingTextMessageContentEvent {
    /// Create a new thinking text message content event.
    pub fn new(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Thinking text message end event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingTextMessageEndEvent {
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ThinkingTextMessageEndEvent {
    /// Create a new thinking text message end event.
    pub fn new() -> Self {
        Self {
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

// ============================================================================
// Tool Call Events
// ============================================================================

/// Tool call start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallStartEvent {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Tool name.
    pub tool_call_name: String,
    /// Parent message ID (the assistant message containing this tool call).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ToolCallStartEvent {
    /// Create a new tool call start event.
    pub fn new(tool_call_id: impl Into<String>, tool_call_name: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_call_name: tool_call_name.into(),
            parent_message_id: None,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }

    /// Set the parent message ID.
    pub fn with_parent_message_id(mut self, id: impl Into<String>) -> Self {
        self.parent_message_id = Some(id.into());
        self
    }
}

/// Tool call args event (streaming arguments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallArgsEvent {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Arguments delta (JSON fragment).
    pub delta: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ToolCallArgsEvent {
    /// Create a new tool call args event.
    pub fn new(tool_call_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            delta: delta.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Tool call end event (arguments complete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallEndEvent {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ToolCallEndEvent {
    /// Create a new tool call end event.
    pub fn new(tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Tool call chunk event.
///
/// The first chunk of a call must carry both `toolCallId` and `toolCallName`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallChunkEvent {
    /// Tool call identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_name: Option<String>,
    /// Parent message ID, forwarded onto the synthesized start event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    /// Arguments delta (JSON fragment).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ToolCallChunkEvent {
    /// Create an empty tool call chunk.
    pub fn new() -> Self {
        Self {
            timestamp: Some(now_millis()),
            ..Self::default()
        }
    }

    /// Set the tool call ID.
    pub fn with_tool_call_id(mut self, id: impl Into<String>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }

    /// Set the tool name.
    pub fn with_tool_call_name(mut self, name: impl Into<String>) -> Self {
        self.tool_call_name = Some(name.into());
        self
    }

    /// Set the parent message ID.
    pub fn with_parent_message_id(mut self, id: impl Into<String>) -> Self {
        self.parent_message_id = Some(id.into());
        self
    }

    /// Set the arguments delta.
    pub fn with_delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = Some(delta.into());
        self
    }
}

/// Tool call result event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResultEvent {
    /// Identifier of the tool message carrying the result.
    pub message_id: String,
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Result content.
    pub content: String,
    /// Role of the result message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl ToolCallResultEvent {
    /// Create a new tool call result event.
    pub fn new(
        message_id: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            role: Some(Role::Tool),
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

// ============================================================================
// State Events
// ============================================================================

/// State snapshot event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshotEvent {
    /// State snapshot data.
    pub snapshot: Value,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl StateSnapshotEvent {
    /// Create a new state snapshot event.
    pub fn new(snapshot: Value) -> Self {
        Self {
            snapshot,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// State delta event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDeltaEvent {
    /// JSON Patch (RFC 6902) operations.
    pub delta: Vec<Value>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl StateDeltaEvent {
    /// Create a new state delta event.
    pub fn new(delta: Vec<Value>) -> Self {
        Self {
            delta,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

/// Messages snapshot event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesSnapshotEvent {
    /// Messages array.
    pub messages: Vec<Value>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl MessagesSnapshotEvent {
    /// Create a new messages snapshot event.
    pub fn new(messages: Vec<Value>) -> Self {
        Self {
            messages,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

// ============================================================================
// Custom/Raw Events
// ============================================================================

/// Raw event for passthrough data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// The wrapped external event.
    pub event: Value,
    /// Name of the system that produced the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl RawEvent {
    /// Create a new raw event.
    pub fn new(event: Value) -> Self {
        Self {
            event,
            source: None,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }

    /// Set the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Custom event for application-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEvent {
    /// Event name/subtype.
    pub name: String,
    /// Event value.
    pub value: Value,
    /// Timestamp in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Source event passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_event: Option<Value>,
}

impl CustomEvent {
    /// Create a new custom event.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp: Some(now_millis()),
            raw_event: None,
        }
    }
}

// Common builders and enum conversions.
impl_event_payload! {
    RunStarted => RunStartedEvent,
    RunFinished => RunFinishedEvent,
    RunError => RunErrorEvent,
    StepStarted => StepStartedEvent,
    StepFinished => StepFinishedEvent,
    TextMessageStart => TextMessageStartEvent,
    TextMessageContent => TextMessageContentEvent,
    TextMessageEnd => TextMessageEndEvent,
    TextMessageChunk => TextMessageChunkEvent,
    ThinkingStart => ThinkingStartEvent,
    ThinkingEnd => ThinkingEndEvent,
    ThinkingTextMessageStart => ThinkingTextMessageStartEvent,
    ThinkingTextMessageContent => ThinkingTextMessageContentEvent,
    ThinkingTextMessageEnd => ThinkingTextMessageEndEvent,
    ToolCallStart => ToolCallStartEvent,
    ToolCallArgs => ToolCallArgsEvent,
    ToolCallEnd => ToolCallEndEvent,
    ToolCallChunk => ToolCallChunkEvent,
    ToolCallResult => ToolCallResultEvent,
    StateSnapshot => StateSnapshotEvent,
    StateDelta => StateDeltaEvent,
    MessagesSnapshot => MessagesSnapshotEvent,
    Raw => RawEvent,
    Custom => CustomEvent,
}
