//! # ag-ui-core
//!
//! Core types and error handling for the AG-UI protocol.
//!
//! This crate provides the foundational vocabulary shared by every stage of
//! an AG-UI event pipeline:
//!
//! - **Events**: The closed [`Event`] enum and one payload struct per event type
//! - **Errors**: Protocol violations, chunk malformations, and the umbrella [`AgUiError`]
//! - **Validation**: Per-event field checks via [`Event::validate`]
//!
//! ## Example
//!
//! ```rust
//! use ag_ui_core::{Event, EventType, TextMessageContentEvent};
//!
//! let event: Event = TextMessageContentEvent::new("msg-1", "Hello").into();
//! assert_eq!(event.event_type(), EventType::TextMessageContent);
//!
//! let json = event.to_json().unwrap();
//! assert!(json.contains(r#""type":"TEXT_MESSAGE_CONTENT""#));
//!
//! let decoded = Event::from_json(&json).unwrap();
//! assert_eq!(decoded, event);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod errors;
pub mod events;

// Re-exports for convenience
pub use errors::{AgUiError, ChunkError, ProtocolError, Result};
pub use events::{
    // Core enum and discriminator
    Event, EventType, Role,
    // Run lifecycle
    RunErrorEvent, RunFinishedEvent, RunStartedEvent,
    // Steps
    StepFinishedEvent, StepStartedEvent,
    // Text messages
    TextMessageChunkEvent, TextMessageContentEvent, TextMessageEndEvent, TextMessageStartEvent,
    // Thinking
    ThinkingEndEvent, ThinkingStartEvent, ThinkingTextMessageContentEvent,
    ThinkingTextMessageEndEvent, ThinkingTextMessageStartEvent,
    // Tool calls
    ToolCallArgsEvent, ToolCallChunkEvent, ToolCallEndEvent, ToolCallResultEvent,
    ToolCallStartEvent,
    // State
    MessagesSnapshotEvent, StateDeltaEvent, StateSnapshotEvent,
    // Escape hatches
    CustomEvent, RawEvent,
};

/// Prelude module for common imports.
///
/// ```rust
/// use ag_ui_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{AgUiError, ChunkError, ProtocolError, Result};
    pub use crate::events::*;
}
