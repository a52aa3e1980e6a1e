//! Progress reporting.
//!
//! Two channels leave a pipeline run:
//!
//! - [`ProgressSink`] carries UI hints. Emitting never blocks; when the
//!   receiver lags behind, events are dropped.
//! - [`CheckpointSink`] carries durable checkpoints. The pipeline awaits each
//!   call before moving on, and a failed checkpoint aborts the run.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::block::BlockKind;
use crate::outline::Outline;
use crate::slide::Slide;
use crate::violation::ViolationAction;
use crate::{Result, TRACING_TARGET_PROGRESS};

/// Incremental text written into one block of a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDelta {
    pub block_index: usize,
    pub block_kind: BlockKind,
    /// Characters appended since the previous delta for this block.
    pub text: String,
}

/// A progress notification, tagged by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Outline acquisition started (`outline` empty) or finished.
    Outline {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outline: Option<Outline>,
    },
    /// Theme resolved.
    Template { theme_id: String },
    /// Content generation for one slide: start, streamed delta or completion.
    Content {
        slide_index: usize,
        total_slides: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delta: Option<ContentDelta>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slide: Option<Slide>,
    },
    /// Validation result for one slide.
    Validation {
        slide_index: usize,
        total_slides: usize,
        violations: usize,
    },
    /// Repair attempt for one slide.
    Repair {
        slide_index: usize,
        action: ViolationAction,
        attempt: usize,
    },
    /// Image generation for one slide.
    Images {
        image_index: usize,
        total_images: usize,
        slide_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl ProgressEvent {
    /// Stage name of this event.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Outline { .. } => "outline",
            Self::Template { .. } => "template",
            Self::Content { .. } => "content",
            Self::Validation { .. } => "validation",
            Self::Repair { .. } => "repair",
            Self::Images { .. } => "images",
        }
    }
}

/// Best-effort sender for UI progress hints.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    sender: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressSink {
    /// Creates a bounded channel and returns the sink with its receiver.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }

    pub fn new(sender: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// A sink that discards every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Sends an event without waiting; drops it if the channel is full or closed.
    pub fn emit(&self, event: ProgressEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::trace!(
                    target: TRACING_TARGET_PROGRESS,
                    stage = event.stage(),
                    "Progress channel full, dropping event"
                );
            }
            Err(TrySendError::Closed(event)) => {
                tracing::trace!(
                    target: TRACING_TARGET_PROGRESS,
                    stage = event.stage(),
                    "Progress channel closed, dropping event"
                );
            }
        }
    }
}

/// Durable checkpoints awaited by the pipeline.
#[async_trait::async_trait]
pub trait CheckpointSink: Send + Sync {
    /// Called once the outline has been composed, count-enforced and rebalanced.
    async fn outline_composed(&self, outline: &Outline) -> Result<()>;

    /// Called once a slide has been repaired and assigned a layout.
    async fn slide_finalized(&self, index: usize, slide: &Slide) -> Result<()>;
}

/// Checkpoint sink that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCheckpoint;

#[async_trait::async_trait]
impl CheckpointSink for NoopCheckpoint {
    async fn outline_composed(&self, _outline: &Outline) -> Result<()> {
        Ok(())
    }

    async fn slide_finalized(&self, _index: usize, _slide: &Slide) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_is_tagged_by_stage() {
        let event = ProgressEvent::Template {
            theme_id: "nordic".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["stage"], "template");
        assert_eq!(json["theme_id"], "nordic");
    }

    #[tokio::test]
    async fn full_channel_drops_events() {
        let (sink, mut receiver) = ProgressSink::channel(1);
        sink.emit(ProgressEvent::Outline { outline: None });
        sink.emit(ProgressEvent::Template {
            theme_id: "default".into(),
        });

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.stage(), "outline");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn closed_channel_does_not_panic() {
        let (sink, receiver) = ProgressSink::channel(4);
        drop(receiver);
        sink.emit(ProgressEvent::Outline { outline: None });
        ProgressSink::disabled().emit(ProgressEvent::Outline { outline: None });
    }
}
