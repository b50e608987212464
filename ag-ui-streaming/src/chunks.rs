//! Chunk expansion.
//!
//! Agents that stream deltas without bracketing them in START/END events emit
//! `TEXT_MESSAGE_CHUNK` and `TOOL_CALL_CHUNK` instead. [`ChunkTransformer`]
//! rewrites those into canonical START / CONTENT / END sequences so the
//! verifier and downstream consumers only ever see the canonical form.

use ag_ui_core::events::now_millis;
use ag_ui_core::{
    ChunkError, Event, TextMessageChunkEvent, TextMessageContentEvent, TextMessageEndEvent,
    TextMessageStartEvent, ToolCallArgsEvent, ToolCallChunkEvent, ToolCallEndEvent,
    ToolCallStartEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

/// Configuration for chunk expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Close an open chunk sequence before `RUN_FINISHED` / `RUN_ERROR`
    /// passes through.
    pub close_on_run_end: bool,
    /// Close an open chunk sequence when the source stream ends.
    pub close_on_stream_end: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            close_on_run_end: true,
            close_on_stream_end: true,
        }
    }
}

impl ChunkConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether run-ending events close an open chunk sequence.
    #[must_use]
    pub fn close_on_run_end(mut self, enabled: bool) -> Self {
        self.close_on_run_end = enabled;
        self
    }

    /// Set whether stream end closes an open chunk sequence.
    #[must_use]
    pub fn close_on_stream_end(mut self, enabled: bool) -> Self {
        self.close_on_stream_end = enabled;
        self
    }
}

/// The sequence the transformer currently considers open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChunkMode {
    /// Nothing open.
    #[default]
    None,
    /// A text message is open.
    Text {
        /// ID of the open message.
        message_id: String,
    },
    /// A tool call is open.
    ToolCall {
        /// ID of the open tool call.
        tool_call_id: String,
        /// Name of the tool being called.
        tool_call_name: String,
        /// Message the call belongs to, if any.
        parent_message_id: Option<String>,
    },
}

/// Timestamp and raw source copied onto synthesized events.
#[derive(Clone, Default)]
struct Origin {
    timestamp: Option<i64>,
    raw_event: Option<Value>,
}

/// Expands chunk events into canonical start/content/end sequences.
///
/// At most one sequence is open at a time. Canonical START/END events pass
/// through unchanged but update the tracked mode, so a stream can mix both
/// styles. Every other event passes through untouched.
#[derive(Debug, Clone, Default)]
pub struct ChunkTransformer {
    config: ChunkConfig,
    mode: ChunkMode,
    // Whether the open sequence was started by a chunk rather than a
    // canonical START.
    synthesized: bool,
}

impl ChunkTransformer {
    /// Create a transformer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transformer with the given configuration.
    pub fn with_config(config: ChunkConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Get the currently open sequence.
    pub fn mode(&self) -> &ChunkMode {
        &self.mode
    }

    /// Whether a chunk-started sequence is waiting for its END.
    pub fn has_open_sequence(&self) -> bool {
        self.synthesized && self.mode != ChunkMode::None
    }

    /// Forget the open sequence without emitting anything.
    pub fn reset(&mut self) {
        self.mode = ChunkMode::None;
        self.synthesized = false;
    }

    /// Transform one event into zero or more canonical events.
    ///
    /// A failed chunk leaves the transformer state untouched.
    pub fn transform(&mut self, event: Event) -> Result<Vec<Event>, ChunkError> {
        match event {
            Event::TextMessageChunk(chunk) => self.expand_text(chunk),
            Event::ToolCallChunk(chunk) => self.expand_tool_call(chunk),
            event => Ok(self.observe(event)),
        }
    }

    /// Close any chunk-started sequence still open at end of input.
    pub fn finish(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        if self.has_open_sequence() {
            debug!(mode = ?self.mode, "closing chunk sequence at end of stream");
            self.close(&mut out, Origin::default());
        }
        out
    }

    fn expand_text(&mut self, chunk: TextMessageChunkEvent) -> Result<Vec<Event>, ChunkError> {
        let TextMessageChunkEvent {
            message_id,
            role,
            delta,
            timestamp,
            raw_event,
        } = chunk;
        let origin = Origin {
            timestamp,
            raw_event,
        };

        let needs_start = match (&self.mode, &message_id) {
            (ChunkMode::Text { message_id: open }, Some(id)) => open != id,
            (ChunkMode::Text { .. }, None) => false,
            _ => true,
        };

        let mut out = Vec::new();
        let active_id = if needs_start {
            let id = message_id.ok_or_else(ChunkError::missing_message_id)?;
            self.close(&mut out, origin.for_close());
            trace!(message_id = %id, "starting text message from chunk");
            out.push(
                TextMessageStartEvent {
                    message_id: id.clone(),
                    role: role.unwrap_or_default(),
                    timestamp: origin.timestamp,
                    raw_event: origin.raw_event.clone(),
                }
                .into(),
            );
            self.mode = ChunkMode::Text {
                message_id: id.clone(),
            };
            self.synthesized = true;
            id
        } else {
            match &self.mode {
                ChunkMode::Text { message_id } => message_id.clone(),
                _ => return Err(ChunkError::missing_message_id()),
            }
        };

        if let Some(delta) = delta.filter(|d| !d.is_empty()) {
            out.push(
                TextMessageContentEvent {
                    message_id: active_id,
                    delta,
                    timestamp: origin.timestamp,
                    raw_event: origin.raw_event,
                }
                .into(),
            );
        }
        Ok(out)
    }

    fn expand_tool_call(&mut self, chunk: ToolCallChunkEvent) -> Result<Vec<Event>, ChunkError> {
        let ToolCallChunkEvent {
            tool_call_id,
            tool_call_name,
            parent_message_id,
            delta,
            timestamp,
            raw_event,
        } = chunk;
        let origin = Origin {
            timestamp,
            raw_event,
        };

        let needs_start = match (&self.mode, &tool_call_id) {
            (ChunkMode::ToolCall { tool_call_id: open, .. }, Some(id)) => open != id,
            (ChunkMode::ToolCall { .. }, None) => false,
            _ => true,
        };

        let mut out = Vec::new();
        let active_id = if needs_start {
            let (id, name) = match (tool_call_id, tool_call_name) {
                (Some(id), Some(name)) => (id, name),
                _ => return Err(ChunkError::missing_tool_call_fields()),
            };
            self.close(&mut out, origin.for_close());
            trace!(tool_call_id = %id, tool_call_name = %name, "starting tool call from chunk");
            out.push(
                ToolCallStartEvent {
                    tool_call_id: id.clone(),
                    tool_call_name: name.clone(),
                    parent_message_id: parent_message_id.clone(),
                    timestamp: origin.timestamp,
                    raw_event: origin.raw_event.clone(),
                }
                .into(),
            );
            self.mode = ChunkMode::ToolCall {
                tool_call_id: id.clone(),
                tool_call_name: name,
                parent_message_id,
            };
            self.synthesized = true;
            id
        } else {
            match &self.mode {
                ChunkMode::ToolCall { tool_call_id, .. } => tool_call_id.clone(),
                _ => return Err(ChunkError::missing_tool_call_fields()),
            }
        };

        if let Some(delta) = delta.filter(|d| !d.is_empty()) {
            out.push(
                ToolCallArgsEvent {
                    tool_call_id: active_id,
                    delta,
                    timestamp: origin.timestamp,
                    raw_event: origin.raw_event,
                }
                .into(),
            );
        }
        Ok(out)
    }

    /// Track canonical events and pass them through.
    fn observe(&mut self, event: Event) -> Vec<Event> {
        let mut out = Vec::new();
        match &event {
            Event::TextMessageStart(e) => {
                if self.synthesized {
                    self.close(&mut out, Origin::from_event(&event));
                }
                self.mode = ChunkMode::Text {
                    message_id: e.message_id.clone(),
                };
                self.synthesized = false;
            }
            Event::ToolCallStart(e) => {
                if self.synthesized {
                    self.close(&mut out, Origin::from_event(&event));
                }
                self.mode = ChunkMode::ToolCall {
                    tool_call_id: e.tool_call_id.clone(),
                    tool_call_name: e.tool_call_name.clone(),
                    parent_message_id: e.parent_message_id.clone(),
                };
                self.synthesized = false;
            }
            Event::TextMessageEnd(e) => {
                if matches!(&self.mode, ChunkMode::Text { message_id } if *message_id == e.message_id)
                {
                    self.reset();
                }
            }
            Event::ToolCallEnd(e) => {
                if matches!(&self.mode, ChunkMode::ToolCall { tool_call_id, .. } if *tool_call_id == e.tool_call_id)
                {
                    self.reset();
                }
            }
            Event::RunFinished(_) | Event::RunError(_)
                if self.config.close_on_run_end && self.has_open_sequence() =>
            {
                debug!(mode = ?self.mode, "closing chunk sequence before run end");
                self.close(&mut out, Origin::from_event(&event));
            }
            _ => {}
        }
        out.push(event);
        out
    }

    /// Emit the END for whatever is open and clear the mode.
    fn close(&mut self, out: &mut Vec<Event>, origin: Origin) {
        let timestamp = origin.timestamp.or_else(|| Some(now_millis()));
        match std::mem::take(&mut self.mode) {
            ChunkMode::None => {}
            ChunkMode::Text { message_id } => {
                trace!(message_id = %message_id, "closing text message");
                out.push(
                    TextMessageEndEvent {
                        message_id,
                        timestamp,
                        raw_event: origin.raw_event,
                    }
                    .into(),
                );
            }
            ChunkMode::ToolCall { tool_call_id, .. } => {
                trace!(tool_call_id = %tool_call_id, "closing tool call");
                out.push(
                    ToolCallEndEvent {
                        tool_call_id,
                        timestamp,
                        raw_event: origin.raw_event,
                    }
                    .into(),
                );
            }
        }
        self.synthesized = false;
    }
}

impl Origin {
    /// The END of the previous sequence keeps the time but not the raw
    /// source, which belongs to the event that forced the close.
    fn for_close(&self) -> Self {
        Self {
            timestamp: self.timestamp,
            raw_event: None,
        }
    }

    fn from_event(event: &Event) -> Self {
        Self {
            timestamp: event.timestamp(),
            raw_event: None,
        }
    }
}
