//! Structural slide composition.

use decksmith_core::outline::{MAX_HINTS, Outline, OutlineSlide};
use decksmith_core::slide::SlideType;

use crate::locale;

const TRACING_TARGET: &str = "decksmith_engine::compose";

/// Which structural slides the composer maintains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    pub ensure_cover: bool,
    pub ensure_agenda: bool,
    pub ensure_summary: bool,
    /// Content slides allowed before an agenda is synthesised.
    pub max_slides_without_agenda: usize,
    /// Language of synthesised titles.
    pub language: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            ensure_cover: true,
            ensure_agenda: true,
            ensure_summary: true,
            max_slides_without_agenda: 6,
            language: "en".to_string(),
        }
    }
}

impl ComposeOptions {
    /// Default options for the given language.
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }
}

/// Ensures the outline has cover, agenda and summary slides in canonical
/// positions: cover first, agenda second, summary last.
///
/// Structural slides are found anywhere in the outline and moved rather than
/// duplicated; extra copies are dropped. Applying this twice yields the same
/// outline as applying it once.
pub fn compose(outline: Outline, options: &ComposeOptions) -> Outline {
    let phrases = locale::phrases(&options.language);
    let title = outline.title;

    let mut cover = None;
    let mut agenda = None;
    let mut summary = None;
    let mut content = Vec::with_capacity(outline.slides.len());
    let mut dropped = 0usize;

    for slide in outline.slides {
        let slot = match slide.slide_type {
            Some(SlideType::Cover) => &mut cover,
            Some(SlideType::Agenda) => &mut agenda,
            Some(SlideType::SummaryNextSteps) => &mut summary,
            _ => {
                content.push(slide);
                continue;
            }
        };
        if slot.is_none() {
            *slot = Some(slide);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::debug!(
            target: TRACING_TARGET,
            dropped,
            "Dropped duplicate structural slides"
        );
    }

    if cover.is_none() && options.ensure_cover {
        let cover_title = if title.trim().is_empty() {
            phrases.presentation
        } else {
            title.as_str()
        };
        cover = Some(OutlineSlide::new(cover_title, SlideType::Cover));
    }

    if agenda.is_none()
        && options.ensure_agenda
        && content.len() > options.max_slides_without_agenda
    {
        agenda = Some(
            OutlineSlide::new(phrases.agenda, SlideType::Agenda).with_hints(sections(&content)),
        );
    }

    if summary.is_none() && options.ensure_summary {
        summary = Some(OutlineSlide::new(
            phrases.summary,
            SlideType::SummaryNextSteps,
        ));
    }

    let mut slides = Vec::with_capacity(content.len() + 3);
    slides.extend(cover);
    slides.extend(agenda);
    slides.append(&mut content);
    slides.extend(summary);

    tracing::debug!(
        target: TRACING_TARGET,
        slides = slides.len(),
        "Outline composed"
    );

    Outline::new(title, slides)
}

/// Rebuilds the agenda hints from the sections currently in the outline.
pub fn refresh_agenda(outline: &mut Outline) {
    let sections = sections(&outline.slides);
    if let Some(agenda) = outline.slides.iter_mut().find(|s| s.is(SlideType::Agenda)) {
        agenda.hints = sections;
        agenda.hints.truncate(MAX_HINTS);
    }
}

/// Titles of the non-structural slides, in order.
fn sections(slides: &[OutlineSlide]) -> Vec<String> {
    slides
        .iter()
        .filter(|s| !s.slide_type.is_some_and(SlideType::is_structural))
        .map(|s| s.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(count: usize) -> Vec<OutlineSlide> {
        (0..count)
            .map(|i| OutlineSlide::new(format!("Topic {i}"), SlideType::Bullets))
            .collect()
    }

    fn types(outline: &Outline) -> Vec<SlideType> {
        outline.slides.iter().map(OutlineSlide::effective_type).collect()
    }

    #[test]
    fn adds_cover_and_summary() {
        let outline = compose(Outline::new("Roadmap", content(3)), &ComposeOptions::default());

        assert_eq!(outline.len(), 5);
        assert!(outline.slides[0].is(SlideType::Cover));
        assert_eq!(outline.slides[0].title, "Roadmap");
        assert!(outline.slides[4].is(SlideType::SummaryNextSteps));
        assert_eq!(outline.position_of(SlideType::Agenda), None);
    }

    #[test]
    fn adds_agenda_above_threshold() {
        let outline = compose(Outline::new("Roadmap", content(7)), &ComposeOptions::default());

        assert!(outline.slides[1].is(SlideType::Agenda));
        assert_eq!(outline.slides[1].hints, ["Topic 0", "Topic 1", "Topic 2"]);
        assert_eq!(outline.len(), 10);
    }

    #[test]
    fn refreshed_agenda_lists_current_sections() {
        let mut outline = compose(Outline::new("Roadmap", content(7)), &ComposeOptions::default());
        outline.slides.remove(2);
        outline
            .slides
            .insert(3, OutlineSlide::new("Budget", SlideType::Stats));

        refresh_agenda(&mut outline);

        assert_eq!(outline.slides[1].hints, ["Topic 1", "Budget", "Topic 2"]);
    }

    #[test]
    fn relocates_instead_of_duplicating() {
        let mut slides = content(2);
        slides.insert(1, OutlineSlide::new("Wrap up", SlideType::SummaryNextSteps));
        slides.push(OutlineSlide::new("Title", SlideType::Cover));
        slides.push(OutlineSlide::new("Second cover", SlideType::Cover));

        let outline = compose(Outline::new("Deck", slides), &ComposeOptions::default());

        assert_eq!(
            types(&outline),
            [
                SlideType::Cover,
                SlideType::Bullets,
                SlideType::Bullets,
                SlideType::SummaryNextSteps
            ]
        );
        assert_eq!(outline.slides[0].title, "Title");
        assert_eq!(outline.slides[3].title, "Wrap up");
    }

    #[test]
    fn composition_is_idempotent() {
        let options = ComposeOptions::for_language("no");
        for count in [0, 1, 6, 7, 12] {
            let once = compose(Outline::new("Møte", content(count)), &options);
            let twice = compose(once.clone(), &options);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn untitled_outline_gets_localised_cover() {
        let outline = compose(Outline::new("", content(1)), &ComposeOptions::for_language("nb"));
        assert_eq!(outline.slides[0].title, "Presentasjon");
        assert_eq!(outline.slides[2].title, "Oppsummering og veien videre");
    }

    #[test]
    fn disabled_slides_are_not_synthesised() {
        let options = ComposeOptions {
            ensure_cover: false,
            ensure_summary: false,
            ..ComposeOptions::default()
        };
        let outline = compose(Outline::new("Deck", content(2)), &options);
        assert_eq!(types(&outline), [SlideType::Bullets, SlideType::Bullets]);
    }
}
