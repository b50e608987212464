//! Synchronous chunk expansion followed by verification.

use crate::chunks::{ChunkConfig, ChunkTransformer};
use crate::verifier::{EventVerifier, RunPhase, VerifierConfig};
use ag_ui_core::{AgUiError, Event, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for both pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Verifier settings.
    pub verifier: VerifierConfig,
    /// Chunk transformer settings.
    pub chunks: ChunkConfig,
}

impl PipelineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verifier configuration.
    #[must_use]
    pub fn verifier(mut self, config: VerifierConfig) -> Self {
        self.verifier = config;
        self
    }

    /// Set the chunk transformer configuration.
    #[must_use]
    pub fn chunks(mut self, config: ChunkConfig) -> Self {
        self.chunks = config;
        self
    }
}

/// The standard pipeline: raw events → chunk transformer → verifier.
///
/// Fails closed: after the first error every call returns
/// [`AgUiError::Terminated`].
///
/// ```rust
/// use ag_ui_core::{Event, RunStartedEvent, TextMessageChunkEvent};
/// use ag_ui_streaming::EventPipeline;
///
/// let mut pipeline = EventPipeline::new();
/// pipeline.process(RunStartedEvent::new("thread-1", "run-1").into()).unwrap();
///
/// let chunk = TextMessageChunkEvent::new().with_message_id("msg-1").with_delta("Hi");
/// let events = pipeline.process(chunk.into()).unwrap();
/// assert_eq!(events.len(), 2); // TEXT_MESSAGE_START + TEXT_MESSAGE_CONTENT
///
/// let trailing = pipeline.finish().unwrap();
/// assert_eq!(trailing.len(), 1); // TEXT_MESSAGE_END
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventPipeline {
    config: PipelineConfig,
    transformer: ChunkTransformer,
    verifier: EventVerifier,
    terminated: bool,
}

impl EventPipeline {
    /// Create a pipeline with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with the given configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            transformer: ChunkTransformer::with_config(config.chunks.clone()),
            verifier: EventVerifier::with_config(config.verifier.clone()),
            config,
            terminated: false,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the verifier stage.
    pub fn verifier(&self) -> &EventVerifier {
        &self.verifier
    }

    /// Get the chunk transformer stage.
    pub fn transformer(&self) -> &ChunkTransformer {
        &self.transformer
    }

    /// Whether a previous error has terminated the pipeline.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Run one event through both stages.
    pub fn process(&mut self, event: Event) -> Result<Vec<Event>> {
        self.ensure_live()?;
        let result = self
            .transformer
            .transform(event)
            .map_err(AgUiError::from)
            .and_then(|events| self.verify_all(events));
        self.settle(result)
    }

    /// Flush the transformer at end of input.
    ///
    /// Honors [`ChunkConfig::close_on_stream_end`]; when disabled nothing is
    /// emitted and an open chunk sequence is left for the caller.
    pub fn finish(&mut self) -> Result<Vec<Event>> {
        self.ensure_live()?;
        let result = if self.config.chunks.close_on_stream_end {
            let trailing = self.transformer.finish();
            self.verify_all(trailing)
        } else {
            Ok(Vec::new())
        };
        if result.is_ok() && self.verifier.phase() == RunPhase::Running {
            warn!("event pipeline finished before RUN_FINISHED or RUN_ERROR");
        }
        self.settle(result)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.terminated {
            Err(AgUiError::Terminated)
        } else {
            Ok(())
        }
    }

    fn verify_all(&mut self, events: Vec<Event>) -> Result<Vec<Event>> {
        events
            .into_iter()
            .map(|event| self.verifier.verify(event).map_err(AgUiError::from))
            .collect()
    }

    fn settle(&mut self, result: Result<Vec<Event>>) -> Result<Vec<Event>> {
        if let Err(ref err) = result {
            warn!(error = %err, "event pipeline terminated");
            self.terminated = true;
        }
        result
    }
}
