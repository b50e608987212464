//! Async stream adapters over AG-UI event sources.
//!
//! Sources yield `Result<Event, AgUiError>` so transport failures can travel
//! alongside events. Every adapter fails closed: the first error is yielded
//! once and the stream then ends.

use crate::chunks::{ChunkConfig, ChunkTransformer};
use crate::pipeline::PipelineConfig;
use crate::verifier::{EventVerifier, RunPhase, VerifierConfig};
use ag_ui_core::{AgUiError, Event};
use futures::Stream;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, warn};

pin_project! {
    /// Stream that expands chunk events into canonical sequences.
    pub struct ChunkStream<S> {
        #[pin]
        inner: S,
        transformer: ChunkTransformer,
        pending: VecDeque<Event>,
        finished: bool,
    }
}

impl<S> ChunkStream<S> {
    /// Wrap a source with the default chunk configuration.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, ChunkConfig::default())
    }

    /// Wrap a source with the given chunk configuration.
    pub fn with_config(inner: S, config: ChunkConfig) -> Self {
        Self {
            inner,
            transformer: ChunkTransformer::with_config(config),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Get the transformer state.
    pub fn transformer(&self) -> &ChunkTransformer {
        &self.transformer
    }

    /// Whether the stream has nothing more to yield.
    pub fn is_terminated(&self) -> bool {
        self.finished && self.pending.is_empty()
    }
}

impl<S> Stream for ChunkStream<S>
where
    S: Stream<Item = Result<Event, AgUiError>>,
{
    type Item = Result<Event, AgUiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => match this.transformer.transform(event) {
                    // A chunk may expand to nothing; keep polling.
                    Ok(events) => this.pending.extend(events),
                    Err(err) => {
                        warn!(error = %err, "chunk expansion failed, closing stream");
                        *this.finished = true;
                        return Poll::Ready(Some(Err(err.into())));
                    }
                },
                Poll::Ready(Some(Err(err))) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    if this.transformer.config().close_on_stream_end {
                        this.pending.extend(this.transformer.finish());
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

pin_project! {
    /// Stream that enforces the AG-UI grammar on every event.
    pub struct VerifiedStream<S> {
        #[pin]
        inner: S,
        verifier: EventVerifier,
        finished: bool,
    }
}

impl<S> VerifiedStream<S> {
    /// Wrap a source with the default verifier configuration.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, VerifierConfig::default())
    }

    /// Wrap a source with the given verifier configuration.
    pub fn with_config(inner: S, config: VerifierConfig) -> Self {
        Self {
            inner,
            verifier: EventVerifier::with_config(config),
            finished: false,
        }
    }

    /// Get the verifier state.
    pub fn verifier(&self) -> &EventVerifier {
        &self.verifier
    }

    /// Whether the stream has nothing more to yield.
    pub fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl<S> Stream for VerifiedStream<S>
where
    S: Stream<Item = Result<Event, AgUiError>>,
{
    type Item = Result<Event, AgUiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        if *this.finished {
            return Poll::Ready(None);
        }

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(event))) => match this.verifier.verify(event) {
                Ok(event) => Poll::Ready(Some(Ok(event))),
                Err(err) => {
                    *this.finished = true;
                    Poll::Ready(Some(Err(err.into())))
                }
            },
            Poll::Ready(Some(Err(err))) => {
                *this.finished = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                *this.finished = true;
                match this.verifier.phase() {
                    RunPhase::Running => {
                        warn!("event stream ended before RUN_FINISHED or RUN_ERROR");
                    }
                    phase => debug!(?phase, "event stream ended"),
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Extension trait adding AG-UI processing to event streams.
pub trait EventStreamExt: Stream<Item = Result<Event, AgUiError>> + Sized {
    /// Expand chunk events with the default configuration.
    fn transform_chunks(self) -> ChunkStream<Self> {
        ChunkStream::new(self)
    }

    /// Expand chunk events with the given configuration.
    fn transform_chunks_with(self, config: ChunkConfig) -> ChunkStream<Self> {
        ChunkStream::with_config(self, config)
    }

    /// Verify events with the default configuration.
    fn verify_events(self) -> VerifiedStream<Self> {
        VerifiedStream::new(self)
    }

    /// Verify events with the given configuration.
    fn verify_events_with(self, config: VerifierConfig) -> VerifiedStream<Self> {
        VerifiedStream::with_config(self, config)
    }

    /// Expand chunks, then verify: the standard pipeline.
    fn normalize(self) -> VerifiedStream<ChunkStream<Self>> {
        self.normalize_with(PipelineConfig::default())
    }

    /// Expand chunks, then verify, with the given configuration.
    fn normalize_with(self, config: PipelineConfig) -> VerifiedStream<ChunkStream<Self>> {
        self.transform_chunks_with(config.chunks)
            .verify_events_with(config.verifier)
    }
}

impl<S> EventStreamExt for S where S: Stream<Item = Result<Event, AgUiError>> {}
