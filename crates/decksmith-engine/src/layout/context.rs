//! Deck-wide variant assignment.

use std::collections::{HashMap, VecDeque};

use decksmith_core::slide::{Slide, SlideType};

use super::variants::{content_variant, opposite_variant, variants};

const TRACING_TARGET: &str = "decksmith_engine::layout";

/// Variants remembered per slide type.
const RECENT_PER_TYPE: usize = 2;

/// Variant history of one pipeline run.
///
/// Slides must be assigned in deck order.
#[derive(Debug, Default)]
pub struct LayoutContext {
    recent: HashMap<SlideType, VecDeque<&'static str>>,
    previous: Option<(SlideType, &'static str)>,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a variant to the slide and records it.
    pub fn assign(&mut self, slide: &mut Slide) -> &'static str {
        let slide_type = slide.slide_type;
        let variant = self.choose(slide);

        let recent = self.recent.entry(slide_type).or_default();
        recent.push_back(variant);
        if recent.len() > RECENT_PER_TYPE {
            recent.pop_front();
        }
        self.previous = Some((slide_type, variant));

        variant.clone_into(&mut slide.variant);
        variant
    }

    fn choose(&self, slide: &Slide) -> &'static str {
        let slide_type = slide.slide_type;

        if slide_type.is_alternating()
            && let Some((previous_type, previous_variant)) = self.previous
            && previous_type == slide_type
            && let Some(flipped) = opposite_variant(slide_type, previous_variant)
        {
            return flipped;
        }

        let preferred = content_variant(slide);
        let Some(recent) = self.recent.get(&slide_type) else {
            return preferred;
        };
        if !recent.contains(&preferred) {
            return preferred;
        }

        match variants(slide_type).iter().copied().find(|v| !recent.contains(v)) {
            Some(unused) => {
                tracing::trace!(
                    target: TRACING_TARGET,
                    slide_type = slide_type.as_ref(),
                    preferred,
                    chosen = unused,
                    "Variant substituted"
                );
                unused
            }
            None => preferred,
        }
    }
}
