//! # ag-ui-streaming
//!
//! Protocol state machines for AG-UI event streams.
//!
//! This crate turns a raw event sequence from an agent into one that
//! downstream consumers can trust:
//!
//! ```text
//! raw events → ChunkTransformer → EventVerifier → consumer
//! ```
//!
//! ## Core Concepts
//!
//! - **[`ChunkTransformer`]**: Expand `TEXT_MESSAGE_CHUNK` / `TOOL_CALL_CHUNK`
//!   into canonical START / CONTENT / END sequences
//! - **[`EventVerifier`]**: Enforce ordering, nesting, and ID correlation
//! - **[`EventPipeline`]**: Both stages composed, synchronously
//! - **[`EventStreamExt`]**: The same stages as async `Stream` adapters
//!
//! ## Example - Synchronous Verification
//!
//! ```rust
//! use ag_ui_core::{RunStartedEvent, TextMessageEndEvent};
//! use ag_ui_streaming::EventVerifier;
//!
//! let mut verifier = EventVerifier::new();
//! verifier.verify(RunStartedEvent::new("thread-1", "run-1").into()).unwrap();
//!
//! let err = verifier.verify(TextMessageEndEvent::new("msg-1").into()).unwrap_err();
//! println!("rejected: {err}");
//! ```
//!
//! ## Example - Stream Normalization
//!
//! ```ignore
//! use ag_ui_streaming::EventStreamExt;
//! use futures::StreamExt;
//!
//! let mut events = agent_events.normalize();
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     render(event);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod chunks;
pub mod pipeline;
pub mod stream;
pub mod verifier;

// Re-exports
pub use chunks::{ChunkConfig, ChunkMode, ChunkTransformer};
pub use pipeline::{EventPipeline, PipelineConfig};
pub use stream::{ChunkStream, EventStreamExt, VerifiedStream};
pub use verifier::{EventVerifier, RunPhase, VerifierConfig, VerifierState};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ChunkConfig, ChunkStream, ChunkTransformer, EventPipeline, EventStreamExt, EventVerifier,
        PipelineConfig, RunPhase, VerifiedStream, VerifierConfig,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let pipeline = EventPipeline::with_config(PipelineConfig::default());
        assert_eq!(pipeline.verifier().phase(), RunPhase::Idle);
        assert!(ChunkConfig::default().close_on_stream_end);
        assert!(VerifierConfig::default().require_closed_entities);
    }
}
