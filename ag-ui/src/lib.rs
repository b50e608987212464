//! # ag-ui - AG-UI Event Protocol for Rust
//!
//! AG-UI is a protocol for streaming structured events from an agent backend
//! to a frontend. This crate bundles the event vocabulary together with the
//! two state machines every consumer needs:
//!
//! - a **chunk transformer** that expands compact `*_CHUNK` events into
//!   canonical START / CONTENT / END sequences, and
//! - an **event verifier** that rejects the first event breaking the
//!   protocol's ordering, nesting, or ID correlation rules.
//!
//! ## Quick Start
//!
//! ```rust
//! use ag_ui::prelude::*;
//!
//! let mut pipeline = EventPipeline::new();
//!
//! let mut out = Vec::new();
//! for event in [
//!     Event::from(RunStartedEvent::new("thread-1", "run-1")),
//!     TextMessageChunkEvent::new().with_message_id("msg-1").with_delta("Hello").into(),
//!     RunFinishedEvent::new("thread-1", "run-1").into(),
//! ] {
//!     out.extend(pipeline.process(event)?);
//! }
//!
//! // RUN_STARTED, TEXT_MESSAGE_START, TEXT_MESSAGE_CONTENT, TEXT_MESSAGE_END, RUN_FINISHED
//! assert_eq!(out.len(), 5);
//! # Ok::<(), AgUiError>(())
//! ```
//!
//! ## Streams
//!
//! ```ignore
//! use ag_ui::prelude::*;
//! use futures::StreamExt;
//!
//! let mut events = agent_events.normalize();
//! while let Some(event) = events.next().await {
//!     match event {
//!         Ok(event) => ui.apply(event),
//!         Err(err) => {
//!             tracing::error!(%err, "agent broke the AG-UI protocol");
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`ag_ui_core`] - Events, roles, and errors
//! - [`ag_ui_streaming`] - Verifier, chunk transformer, pipeline, and stream adapters

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Event vocabulary and errors.
pub use ag_ui_core as core;

/// Protocol state machines and stream adapters.
pub use ag_ui_streaming as streaming;

// ============================================================================
// Type Re-exports
// ============================================================================

// Errors
pub use ag_ui_core::{AgUiError, ChunkError, ProtocolError, Result};

// Events
pub use ag_ui_core::events::*;

// Verification
pub use ag_ui_streaming::{EventVerifier, RunPhase, VerifierConfig, VerifierState};

// Chunk expansion
pub use ag_ui_streaming::{ChunkConfig, ChunkMode, ChunkTransformer};

// Pipeline and streams
pub use ag_ui_streaming::{
    ChunkStream, EventPipeline, EventStreamExt, PipelineConfig, VerifiedStream,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient prelude for common imports.
///
/// ```rust
/// use ag_ui::prelude::*;
/// ```
pub mod prelude {
    // Errors
    pub use crate::core::{AgUiError, ChunkError, ProtocolError, Result};

    // Events
    pub use crate::core::events::*;

    // State machines
    pub use crate::streaming::{
        ChunkConfig, ChunkTransformer, EventPipeline, EventVerifier, PipelineConfig, RunPhase,
        VerifierConfig,
    };

    // Streams
    pub use crate::streaming::EventStreamExt;
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of ag-ui.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use futures::{stream, StreamExt};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn types(events: &[Event]) -> Vec<EventType> {
        events.iter().map(Event::event_type).collect()
    }

    fn run_pipeline(events: Vec<Event>) -> Result<Vec<Event>> {
        let mut pipeline = EventPipeline::new();
        let mut out = Vec::new();
        for event in events {
            out.extend(pipeline.process(event)?);
        }
        out.extend(pipeline.finish()?);
        Ok(out)
    }

    #[test]
    fn test_version() {
        assert_eq!(super::version(), "0.1.0");
    }

    #[test]
    fn test_open_tool_call_blocks_run_finished() {
        let events: Vec<Event> = vec![
            RunStartedEvent::new("thread-1", "run-1").into(),
            TextMessageStartEvent::new("m1").into(),
            TextMessageContentEvent::new("m1", "Hi").into(),
            TextMessageEndEvent::new("m1").into(),
            ToolCallStartEvent::new("t1", "search").with_parent_message_id("m1").into(),
            RunFinishedEvent::new("thread-1", "run-1").into(),
        ];

        let mut verifier = EventVerifier::new();
        let mut last = None;
        for event in events {
            if let Err(err) = verifier.verify(event) {
                last = Some(err);
                break;
            }
        }

        let err = last.expect("RUN_FINISHED should be rejected");
        assert_eq!(err.event_type, EventType::RunFinished);
        assert!(err.message.contains("'t1'"), "{}", err.message);
    }

    #[test]
    fn test_tool_call_inside_open_message_is_rejected() {
        let mut verifier = EventVerifier::new();
        verifier.verify(RunStartedEvent::new("thread-1", "run-1").into()).unwrap();
        verifier.verify(TextMessageStartEvent::new("m1").into()).unwrap();

        let err = verifier
            .verify(ToolCallStartEvent::new("t1", "search").into())
            .unwrap_err();
        assert!(err.message.contains("'m1'"));
    }

    // Chunk scripts whose expansion must always satisfy the verifier.
    #[rstest]
    #[case::single_text(vec![
        TextMessageChunkEvent::new().with_message_id("m1").with_delta("hi").into(),
    ])]
    #[case::text_continued(vec![
        TextMessageChunkEvent::new().with_message_id("m1").with_delta("hi").into(),
        TextMessageChunkEvent::new().with_message_id("m1").with_delta("there").into(),
        TextMessageChunkEvent::new().with_delta("!").into(),
    ])]
    #[case::text_then_tool(vec![
        TextMessageChunkEvent::new().with_message_id("m1").with_delta("hi").into(),
        ToolCallChunkEvent::new().with_tool_call_id("t1").with_tool_call_name("fn").into(),
        ToolCallChunkEvent::new().with_delta(r#"{"a":1}"#).into(),
    ])]
    #[case::alternating(vec![
        ToolCallChunkEvent::new().with_tool_call_id("t1").with_tool_call_name("a").into(),
        TextMessageChunkEvent::new().with_message_id("m1").into(),
        ToolCallChunkEvent::new().with_tool_call_id("t2").with_tool_call_name("b").into(),
        TextMessageChunkEvent::new().with_message_id("m2").with_delta("done").into(),
    ])]
    #[case::mixed_with_canonical(vec![
        TextMessageStartEvent::new("m1").into(),
        TextMessageChunkEvent::new().with_delta("streamed").into(),
        TextMessageEndEvent::new("m1").into(),
        StepStartedEvent::new("tools").into(),
        StepFinishedEvent::new("tools").into(),
        ToolCallChunkEvent::new().with_tool_call_id("t1").with_tool_call_name("fn").into(),
    ])]
    fn test_expanded_chunks_always_verify(#[case] body: Vec<Event>) {
        let mut events = vec![Event::from(RunStartedEvent::new("thread-1", "run-1"))];
        events.extend(body);
        events.push(RunFinishedEvent::new("thread-1", "run-1").into());

        let out = run_pipeline(events).expect("expanded chunks should verify");
        assert!(out.iter().all(|e| !e.is_chunk()));
        assert_eq!(out.last().map(Event::event_type), Some(EventType::RunFinished));
    }

    #[tokio::test]
    async fn test_normalize_json_event_stream() {
        let lines = [
            json!({"type": "RUN_STARTED", "threadId": "thread-1", "runId": "run-1"}),
            json!({"type": "TEXT_MESSAGE_CHUNK", "messageId": "m1", "delta": "Looking"}),
            json!({"type": "TEXT_MESSAGE_CHUNK", "delta": " it up"}),
            json!({"type": "TOOL_CALL_CHUNK", "toolCallId": "t1", "toolCallName": "search",
                   "parentMessageId": "m1", "delta": "{\"q\":\"rust\"}"}),
            json!({"type": "TOOL_CALL_END", "toolCallId": "t1"}),
            json!({"type": "TOOL_CALL_RESULT", "messageId": "m2", "toolCallId": "t1",
                   "content": "found", "role": "tool"}),
            json!({"type": "STATE_DELTA", "delta": [{"op": "add", "path": "/hits", "value": 1}]}),
            json!({"type": "RUN_FINISHED", "threadId": "thread-1", "runId": "run-1"}),
        ]
        .map(|value| value.to_string());

        let source = stream::iter(lines).map(|line| Event::from_json(&line));
        let out: Vec<Event> = source
            .normalize()
            .map(|item| item.expect("stream should verify"))
            .collect()
            .await;

        assert_eq!(
            types(&out),
            vec![
                EventType::RunStarted,
                EventType::TextMessageStart,
                EventType::TextMessageContent,
                EventType::TextMessageContent,
                EventType::TextMessageEnd,
                EventType::ToolCallStart,
                EventType::ToolCallArgs,
                EventType::ToolCallEnd,
                EventType::ToolCallResult,
                EventType::StateDelta,
                EventType::RunFinished,
            ]
        );
        assert!(matches!(
            &out[5],
            Event::ToolCallStart(e) if e.parent_message_id.as_deref() == Some("m1")
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_stops_stream() {
        let lines = [
            r#"{"type":"RUN_STARTED","threadId":"th","runId":"r"}"#,
            r#"{"type":"NOT_AN_EVENT"}"#,
            r#"{"type":"RUN_FINISHED","threadId":"th","runId":"r"}"#,
        ];
        let out: Vec<_> = stream::iter(lines)
            .map(Event::from_json)
            .normalize()
            .collect()
            .await;

        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], Err(AgUiError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_strict_payload_validation_through_stream() {
        let config = PipelineConfig::new().verifier(VerifierConfig::new().validate_payloads(true));
        let events: Vec<Result<Event>> = vec![
            Ok(RunStartedEvent::new("thread-1", "").into()),
        ];
        let out: Vec<_> = stream::iter(events).normalize_with(config).collect().await;

        assert_eq!(out.len(), 1);
        let err = out[0].as_ref().unwrap_err();
        assert!(err.to_string().contains("runId must not be empty"));
    }
}
