//! Deck outlines.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::slide::SlideType;

/// Maximum number of hints kept per outline slide.
pub const MAX_HINTS: usize = 3;

/// Ordered list of planned slides, before content is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Outline {
    /// Deck title.
    pub title: String,
    /// Planned slides in presentation order.
    pub slides: Vec<OutlineSlide>,
}

/// One planned slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutlineSlide {
    /// Working title.
    pub title: String,
    /// Suggested layout category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_type: Option<SlideType>,
    /// Short content hints, at most three.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl OutlineSlide {
    /// Creates an outline slide with a suggested type.
    pub fn new(title: impl Into<String>, slide_type: SlideType) -> Self {
        Self {
            title: title.into(),
            slide_type: Some(slide_type),
            hints: Vec::new(),
        }
    }

    /// Replaces the hints, keeping at most [`MAX_HINTS`].
    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = hints.into_iter().map(Into::into).take(MAX_HINTS).collect();
        self
    }

    /// Returns true if the slide is suggested as the given type.
    pub fn is(&self, slide_type: SlideType) -> bool {
        self.slide_type == Some(slide_type)
    }

    /// Suggested type, defaulting to bullets.
    pub fn effective_type(&self) -> SlideType {
        self.slide_type.unwrap_or(SlideType::Bullets)
    }
}

impl Outline {
    /// Creates an outline.
    pub fn new(title: impl Into<String>, slides: Vec<OutlineSlide>) -> Self {
        Self {
            title: title.into(),
            slides,
        }
    }

    /// Number of planned slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Returns true if no slides are planned.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Index of the first slide suggested as the given type.
    pub fn position_of(&self, slide_type: SlideType) -> Option<usize> {
        self.slides.iter().position(|s| s.is(slide_type))
    }

    /// Truncates every hint list to [`MAX_HINTS`].
    pub fn normalize_hints(&mut self) {
        for slide in &mut self.slides {
            slide.hints.truncate(MAX_HINTS);
        }
    }
}
