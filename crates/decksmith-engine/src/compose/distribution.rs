//! Slide-type distribution enforcement.

use std::collections::HashSet;

use decksmith_core::analysis::ContentAnalysis;
use decksmith_core::outline::{Outline, OutlineSlide};
use decksmith_core::slide::SlideType;

const TRACING_TARGET: &str = "decksmith_engine::compose";

/// Most bullet-like slides a deck may contain.
pub const MAX_BULLET_LIKE: usize = 2;

/// Outlines shorter than this are left alone.
const MIN_SLIDES: usize = 4;

/// Outlines of at least this length need a premium slide.
const PREMIUM_MIN_SLIDES: usize = 5;

/// Slides looked back on for the reuse penalty.
const RECENT_WINDOW: usize = 3;

const REUSE_PENALTY: f32 = 2.0;
const EARLY_PENALTY: f32 = 1.0;
const LATE_BONUS: f32 = 0.5;
const AUDIENCE_MULTIPLIER: f32 = 1.2;

/// Replacement types in declaration order; ties go to the earlier entry.
const CANDIDATES: [SlideType; 8] = [
    SlideType::Stats,
    SlideType::Timeline,
    SlideType::TimelineRoadmap,
    SlideType::CardGrid,
    SlideType::NumberedGrid,
    SlideType::Comparison,
    SlideType::TextPlusImage,
    SlideType::QuoteCallout,
];

/// Audience keywords and the slide types they favour.
const AUDIENCES: &[(&[&str], &[SlideType])] = &[
    (
        &["executive", "board", "management", "leder", "ledelse", "styre"],
        &[SlideType::Stats, SlideType::Comparison, SlideType::TimelineRoadmap],
    ),
    (
        &["technical", "engineer", "developer", "teknisk", "utvikler", "ingeniør"],
        &[SlideType::Timeline, SlideType::NumberedGrid, SlideType::CardGrid],
    ),
    (
        &["sales", "customer", "marketing", "salg", "kunde", "markedsføring"],
        &[SlideType::CardGrid, SlideType::TextPlusImage, SlideType::QuoteCallout],
    ),
    (
        &["student", "school", "education", "elev", "skole", "undervisning"],
        &[SlideType::Timeline, SlideType::CardGrid, SlideType::TextPlusImage],
    ),
];

/// Rebalances the slide-type mix of an outline.
///
/// At most [`MAX_BULLET_LIKE`] bullet-like slides remain, upgraded from the
/// tail to the best-scoring premium type. Decks of five or more slides get
/// at least one premium slide. Protected types still count towards the cap
/// but are never upgraded; when they alone exceed it, the breach is logged.
pub fn enforce_distribution(
    mut outline: Outline,
    analysis: &ContentAnalysis,
    audience: Option<&str>,
    images_enabled: bool,
) -> Outline {
    if outline.len() < MIN_SLIDES {
        return outline;
    }

    let mut selector = Selector::new(analysis, audience, images_enabled);

    let bullet_like: Vec<usize> = outline
        .slides
        .iter()
        .enumerate()
        .filter(|(_, s)| s.effective_type().is_bullet_like())
        .map(|(i, _)| i)
        .collect();

    let mut excess = bullet_like.len().saturating_sub(MAX_BULLET_LIKE);
    for &index in bullet_like.iter().rev() {
        if excess == 0 {
            break;
        }
        if outline.slides[index].effective_type().is_distribution_protected() {
            continue;
        }
        selector.upgrade(&mut outline.slides, index);
        excess -= 1;
    }

    if excess > 0 {
        tracing::warn!(
            target: TRACING_TARGET,
            excess,
            "Protected slides exceed the bullet-like cap"
        );
    }

    let has_premium = outline
        .slides
        .iter()
        .any(|s| s.effective_type().is_premium());
    if outline.len() >= PREMIUM_MIN_SLIDES && !has_premium {
        match premium_slot(&outline.slides) {
            Some(index) => selector.upgrade(&mut outline.slides, index),
            None => tracing::warn!(
                target: TRACING_TARGET,
                "No slide can be upgraded to a premium type"
            ),
        }
    }

    outline
}

/// Last slide that may change type to become premium.
fn premium_slot(slides: &[OutlineSlide]) -> Option<usize> {
    let upgradable = |s: &OutlineSlide| {
        let t = s.effective_type();
        !t.is_structural() && !t.is_distribution_protected() && t != SlideType::SectionHeader
    };

    slides
        .iter()
        .rposition(|s| upgradable(s) && s.effective_type().is_bullet_like())
        .or_else(|| slides.iter().rposition(upgradable))
}

/// Scored choice of replacement types.
struct Selector<'a> {
    analysis: &'a ContentAnalysis,
    favoured: &'static [SlideType],
    images_enabled: bool,
    tried: HashSet<SlideType>,
}

impl<'a> Selector<'a> {
    fn new(analysis: &'a ContentAnalysis, audience: Option<&str>, images_enabled: bool) -> Self {
        let audience = audience.unwrap_or_default().to_lowercase();
        let favoured = AUDIENCES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| audience.contains(k)))
            .map_or(&[][..], |(_, types)| *types);

        Self {
            analysis,
            favoured,
            images_enabled,
            tried: HashSet::new(),
        }
    }

    fn upgrade(&mut self, slides: &mut [OutlineSlide], index: usize) {
        let replacement = self.select(slides, index);
        let previous = slides[index].effective_type();
        slides[index].slide_type = Some(replacement);
        self.tried.insert(replacement);

        tracing::debug!(
            target: TRACING_TARGET,
            slide_index = index,
            from = previous.as_ref(),
            to = replacement.as_ref(),
            "Slide type upgraded"
        );
    }

    fn select(&mut self, slides: &[OutlineSlide], index: usize) -> SlideType {
        let eligible: Vec<SlideType> = CANDIDATES
            .into_iter()
            .filter(|c| self.base_score(*c) > 0.0)
            .collect();

        if eligible.iter().all(|c| self.tried.contains(c)) {
            self.tried.clear();
        }

        let mut best: Option<(SlideType, f32)> = None;
        for candidate in eligible {
            if self.tried.contains(&candidate) {
                continue;
            }
            let score = self.score(candidate, slides, index);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        best.map_or(SlideType::TextPlusImage, |(candidate, _)| candidate)
    }

    fn base_score(&self, candidate: SlideType) -> f32 {
        let a = self.analysis;
        match candidate {
            SlideType::Stats if a.statistics.len() >= 2 => 3.0,
            SlideType::Timeline if a.sequential_steps.len() >= 3 => 3.0,
            SlideType::TimelineRoadmap if a.has_roadmap => 3.5,
            SlideType::CardGrid if a.features.len() >= 2 => 3.0,
            SlideType::NumberedGrid
                if a.sequential_steps.len() >= 3
                    || a.action_items.len() + a.decisions.len() >= 3 =>
            {
                2.0
            }
            SlideType::NumberedGrid => 0.5,
            SlideType::Comparison if !a.comparisons.is_empty() => 3.0,
            SlideType::TextPlusImage if self.images_enabled => 1.5,
            SlideType::TextPlusImage => 1.0,
            SlideType::QuoteCallout if !a.quotes.is_empty() => 2.5,
            _ => 0.0,
        }
    }

    fn score(&self, candidate: SlideType, slides: &[OutlineSlide], index: usize) -> f32 {
        let mut score = self.base_score(candidate);

        if self.favoured.contains(&candidate) {
            score *= AUDIENCE_MULTIPLIER;
        }

        let recent = &slides[index.saturating_sub(RECENT_WINDOW)..index];
        if recent.iter().any(|s| s.effective_type() == candidate) {
            score -= REUSE_PENALTY;
        }

        let first_content = slides
            .iter()
            .position(|s| s.is(SlideType::Cover))
            .map_or(0, |cover| cover + 1);
        if (first_content..first_content + 2).contains(&index) {
            score -= EARLY_PENALTY;
        }

        let late = index * 4 >= slides.len() * 3;
        if late && matches!(candidate, SlideType::QuoteCallout | SlideType::TimelineRoadmap) {
            score += LATE_BONUS;
        }

        score
    }
}
