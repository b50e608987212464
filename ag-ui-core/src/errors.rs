//! Error types for AG-UI event processing.
//!
//! Two failure kinds come out of the event pipeline:
//!
//! - [`ProtocolError`]: an event is illegal given the current run state
//!   (ordering, nesting, or identifier correlation is broken).
//! - [`ChunkError`]: a chunk event needs to open a new sequence but lacks
//!   the identifying fields to do so.
//!
//! Both are fatal. [`AgUiError`] wraps them together with the errors a
//! surrounding stream can carry.

use crate::events::EventType;
use thiserror::Error;

/// The main error type for AG-UI operations.
#[derive(Error, Debug)]
pub enum AgUiError {
    /// The event stream broke the protocol grammar.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A chunk event could not be expanded.
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error reported by the event source feeding the pipeline.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The pipeline was driven again after a fatal error.
    #[error("Event stream already terminated by an earlier error")]
    Terminated,
}

impl AgUiError {
    /// Create an upstream error from any displayable error.
    pub fn from_err<E: std::fmt::Display>(err: E) -> Self {
        Self::Upstream(err.to_string())
    }

    /// Check if this error came from the protocol state machines.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::Chunk(_))
    }

    /// The event type that triggered the error, when known.
    #[must_use]
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            Self::Protocol(e) => Some(e.event_type),
            Self::Chunk(e) => Some(e.event_type),
            _ => None,
        }
    }
}

/// Result type alias using [`AgUiError`].
pub type Result<T> = std::result::Result<T, AgUiError>;

/// An event violated the protocol's legal state transitions.
///
/// The message names the offending event type and the unmet precondition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProtocolError {
    /// Type of the rejected event.
    pub event_type: EventType,
    /// Human-readable description of the violation.
    pub message: String,
}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(event_type: EventType, message: impl Into<String>) -> Self {
        Self {
            event_type,
            message: message.into(),
        }
    }
}

/// A chunk event could not be turned into a start/content/end sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ChunkError {
    /// Type of the malformed chunk.
    pub event_type: EventType,
    /// Human-readable description of what is missing.
    pub message: String,
}

impl ChunkError {
    /// Create a new chunk error.
    pub fn new(event_type: EventType, message: impl Into<String>) -> Self {
        Self {
            event_type,
            message: message.into(),
        }
    }

    /// A text chunk had to start a message but carried no `messageId`.
    #[must_use]
    pub fn missing_message_id() -> Self {
        Self::new(
            EventType::TextMessageChunk,
            "Cannot send 'TEXT_MESSAGE_CHUNK' event: messageId is required for the first chunk \
             when starting a new text message.",
        )
    }

    /// A tool chunk had to start a call but lacked `toolCallId` or `toolCallName`.
    #[must_use]
    pub fn missing_tool_call_fields() -> Self {
        Self::new(
            EventType::ToolCallChunk,
            "Cannot send 'TOOL_CALL_CHUNK' event: toolCallId and toolCallName are required for \
             the first chunk when starting a new tool call.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display_is_message() {
        let err = ProtocolError::new(EventType::TextMessageEnd, "No active text message");
        assert_eq!(err.to_string(), "No active text message");
    }

    #[test]
    fn test_wrapped_errors() {
        let err: AgUiError = ProtocolError::new(EventType::RunStarted, "boom").into();
        assert!(err.is_protocol());
        assert_eq!(err.event_type(), Some(EventType::RunStarted));
        assert_eq!(err.to_string(), "boom");

        let err: AgUiError = ChunkError::missing_message_id().into();
        assert!(err.is_protocol());
        assert_eq!(err.event_type(), Some(EventType::TextMessageChunk));
        assert!(err.to_string().contains("messageId is required"));
    }

    #[test]
    fn test_upstream_error() {
        let err = AgUiError::from_err("connection reset");
        assert!(!err.is_protocol());
        assert_eq!(err.event_type(), None);
        assert_eq!(err.to_string(), "Upstream error: connection reset");
    }

    #[test]
    fn test_chunk_error_messages() {
        let err = ChunkError::missing_tool_call_fields();
        assert!(err.message.contains("toolCallId and toolCallName are required"));
    }
}
