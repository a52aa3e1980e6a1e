//! Checkpoint sink that records what it receives.

use std::sync::{Arc, Mutex, PoisonError};

use decksmith_core::outline::Outline;
use decksmith_core::progress::CheckpointSink;
use decksmith_core::slide::Slide;
use decksmith_core::{Error, Result};

/// A recorded checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Checkpoint {
    /// The composed outline, by slide count.
    Outline { slides: usize },
    /// A finalized slide.
    Slide { index: usize, slide: Slide },
}

/// Records checkpoints in order and optionally fails on one slide.
#[derive(Debug, Clone, Default)]
pub struct RecordingCheckpoint {
    records: Arc<Mutex<Vec<Checkpoint>>>,
    fail_on_slide: Option<usize>,
}

impl RecordingCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the checkpoint for the slide at `index`.
    pub fn failing_on_slide(index: usize) -> Self {
        Self {
            fail_on_slide: Some(index),
            ..Self::default()
        }
    }

    /// Checkpoints received so far.
    pub fn records(&self) -> Vec<Checkpoint> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, record: Checkpoint) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

#[async_trait::async_trait]
impl CheckpointSink for RecordingCheckpoint {
    async fn outline_composed(&self, outline: &Outline) -> Result<()> {
        self.push(Checkpoint::Outline {
            slides: outline.len(),
        });
        Ok(())
    }

    async fn slide_finalized(&self, index: usize, slide: &Slide) -> Result<()> {
        if self.fail_on_slide == Some(index) {
            return Err(Error::storage().with_message(format!("cannot persist slide {index}")));
        }
        self.push(Checkpoint::Slide {
            index,
            slide: slide.clone(),
        });
        Ok(())
    }
}
