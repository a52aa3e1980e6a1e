//! Final decks.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slide::Slide;

/// Deck metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckMeta {
    /// Unique deck identifier (UUIDv7).
    pub id: Uuid,
    /// Deck title.
    pub title: String,
    /// Language the deck was written in.
    pub language: String,
    /// Resolved theme identifier.
    pub theme_id: String,
    /// Creation timestamp.
    pub created_at: Timestamp,
}

/// The terminal artifact of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub meta: DeckMeta,
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Assembles a deck with a fresh id and the current timestamp.
    pub fn new(
        title: impl Into<String>,
        language: impl Into<String>,
        theme_id: impl Into<String>,
        slides: Vec<Slide>,
    ) -> Self {
        Self {
            meta: DeckMeta {
                id: Uuid::now_v7(),
                title: title.into(),
                language: language.into(),
                theme_id: theme_id.into(),
                created_at: Timestamp::now(),
            },
            slides,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}
