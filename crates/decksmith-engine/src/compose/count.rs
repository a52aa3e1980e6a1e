//! Exact slide-count enforcement.

use std::collections::HashSet;

use decksmith_core::analysis::ContentAnalysis;
use decksmith_core::outline::{Outline, OutlineSlide};
use decksmith_core::slide::SlideType;

use super::composer::refresh_agenda;
use crate::locale::{self, Phrases};

const TRACING_TARGET: &str = "decksmith_engine::compose";

/// Trims or pads the outline to exactly `target` slides.
///
/// Surplus slides are removed from the tail inward, skipping slides that are
/// protected from removal. Missing slides are synthesised from analysis
/// signals, then from generic filler titles, and inserted before a trailing
/// summary. If the target cannot be reached the mismatch is logged and the
/// closest outline is returned.
pub fn enforce_count(
    mut outline: Outline,
    target: usize,
    analysis: &ContentAnalysis,
    language: &str,
) -> Outline {
    let before = outline.len();
    if before > target {
        remove_surplus(&mut outline, target);
    } else if before < target {
        insert_fillers(&mut outline, target, analysis, locale::phrases(language));
    }
    if outline.len() != before {
        refresh_agenda(&mut outline);
    }

    if outline.len() == target {
        if before != target {
            tracing::debug!(
                target: TRACING_TARGET,
                before,
                after = target,
                "Slide count enforced"
            );
        }
    } else {
        tracing::warn!(
            target: TRACING_TARGET,
            target_count = target,
            actual = outline.len(),
            "Could not reach the requested slide count"
        );
    }

    outline
}

fn is_protected(slide: &OutlineSlide) -> bool {
    slide
        .slide_type
        .is_some_and(SlideType::is_removal_protected)
}

fn remove_surplus(outline: &mut Outline, target: usize) {
    let mut index = outline.slides.len();
    while outline.slides.len() > target && index > 0 {
        index -= 1;
        if !is_protected(&outline.slides[index]) {
            outline.slides.remove(index);
        }
    }
}

fn insert_fillers(
    outline: &mut Outline,
    target: usize,
    analysis: &ContentAnalysis,
    phrases: &Phrases,
) {
    let mut seen: HashSet<String> = outline
        .slides
        .iter()
        .map(|s| s.title.to_lowercase())
        .collect();

    let mut position = match outline.slides.last() {
        Some(last) if last.is(SlideType::SummaryNextSteps) => outline.slides.len() - 1,
        _ => outline.slides.len(),
    };

    let signal_slides = signal_fillers(analysis, phrases);
    let mut candidates = signal_slides.into_iter().chain(generic_fillers(phrases));

    while outline.slides.len() < target {
        let Some(slide) = candidates.next() else {
            break;
        };
        if !seen.insert(slide.title.to_lowercase()) {
            continue;
        }
        outline.slides.insert(position, slide);
        position += 1;
    }
}

/// Content slides justified by the analysis, strongest signal first.
fn signal_fillers(analysis: &ContentAnalysis, phrases: &Phrases) -> Vec<OutlineSlide> {
    let mut slides = Vec::new();

    if analysis.features.len() >= 2 {
        slides.push(
            OutlineSlide::new(phrases.key_features, SlideType::CardGrid)
                .with_hints(analysis.features.iter().map(|f| f.title.clone())),
        );
    }
    if analysis.statistics.len() >= 2 {
        slides.push(
            OutlineSlide::new(phrases.key_figures, SlideType::Stats).with_hints(
                analysis
                    .statistics
                    .iter()
                    .map(|s| format!("{} {}", s.value, s.label).trim().to_string()),
            ),
        );
    }
    if analysis.sequential_steps.len() >= 3 {
        slides.push(
            OutlineSlide::new(phrases.process, SlideType::Timeline)
                .with_hints(analysis.sequential_steps.iter().cloned()),
        );
    }
    if let Some(comparison) = analysis.comparisons.first() {
        slides.push(
            OutlineSlide::new(phrases.comparison, SlideType::TwoColumnText)
                .with_hints([comparison.left.clone(), comparison.right.clone()]),
        );
    }
    for topic in &analysis.topics {
        slides.push(OutlineSlide::new(topic.clone(), SlideType::Bullets));
    }

    slides
}

/// Endless generic filler slides; later rounds carry a letter suffix.
fn generic_fillers(phrases: &Phrases) -> impl Iterator<Item = OutlineSlide> + '_ {
    (0usize..).flat_map(move |round| {
        phrases.fillers.iter().map(move |title| {
            let title = if round == 0 {
                (*title).to_string()
            } else {
                format!("{title} ({})", round_suffix(round))
            };
            OutlineSlide::new(title, SlideType::Bullets)
        })
    })
}

fn round_suffix(round: usize) -> String {
    let letter = char::from(b'A' + (round % 26) as u8);
    if round < 26 {
        letter.to_string()
    } else {
        format!("{letter}{}", round / 26)
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::analysis::{Feature, Statistic};

    use super::*;
    use crate::compose::{ComposeOptions, compose};

    fn outline(types: &[SlideType]) -> Outline {
        let slides = types
            .iter()
            .enumerate()
            .map(|(i, t)| OutlineSlide::new(format!("Slide {i}"), *t))
            .collect();
        Outline::new("Deck", slides)
    }

    #[test]
    fn equal_count_is_a_no_op() {
        let input = outline(&[SlideType::Cover, SlideType::Bullets]);
        let output = enforce_count(input.clone(), 2, &ContentAnalysis::default(), "en");
        assert_eq!(input, output);
    }

    #[test]
    fn removes_from_the_tail_around_protected_slides() {
        let input = outline(&[
            SlideType::Cover,
            SlideType::Bullets,
            SlideType::Stats,
            SlideType::QuoteCallout,
            SlideType::Bullets,
            SlideType::SummaryNextSteps,
        ]);
        let output = enforce_count(input, 4, &ContentAnalysis::default(), "en");

        let titles: Vec<_> = output.slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Slide 0", "Slide 1", "Slide 3", "Slide 5"]);
    }

    #[test]
    fn protected_slides_cap_removal() {
        let input = outline(&[
            SlideType::Cover,
            SlideType::SectionHeader,
            SlideType::QuoteCallout,
            SlideType::SummaryNextSteps,
        ]);
        let output = enforce_count(input.clone(), 2, &ContentAnalysis::default(), "en");
        assert_eq!(output, input);
    }

    #[test]
    fn pads_from_analysis_before_summary() {
        let analysis = ContentAnalysis {
            features: vec![
                Feature {
                    title: "Sync".into(),
                    description: "Works offline".into(),
                },
                Feature {
                    title: "Search".into(),
                    description: "Finds anything".into(),
                },
            ],
            statistics: vec![
                Statistic {
                    value: "42%".into(),
                    label: "growth".into(),
                },
                Statistic {
                    value: "3".into(),
                    label: "markets".into(),
                },
            ],
            ..ContentAnalysis::default()
        };
        let input = outline(&[SlideType::Cover, SlideType::SummaryNextSteps]);
        let output = enforce_count(input, 5, &analysis, "en");

        assert_eq!(output.len(), 5);
        assert!(output.slides[1].is(SlideType::CardGrid));
        assert_eq!(output.slides[1].hints, ["Sync", "Search"]);
        assert!(output.slides[2].is(SlideType::Stats));
        assert_eq!(output.slides[2].hints[0], "42% growth");
        assert_eq!(output.slides[3].title, "Background");
        assert!(output.slides[4].is(SlideType::SummaryNextSteps));
    }

    #[test]
    fn agenda_follows_trimmed_sections() {
        let slides = (0..8)
            .map(|i| OutlineSlide::new(format!("Topic {i}"), SlideType::Bullets))
            .collect();
        let composed = compose(Outline::new("Deck", slides), &ComposeOptions::default());
        assert_eq!(composed.slides[1].hints, ["Topic 0", "Topic 1", "Topic 2"]);

        let output = enforce_count(composed, 4, &ContentAnalysis::default(), "en");

        let titles: Vec<_> = output.slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Deck", "Agenda", "Topic 0", "Summary and next steps"]);
        assert_eq!(output.slides[1].hints, ["Topic 0"]);
    }

    #[test]
    fn filler_titles_stay_unique() {
        let input = outline(&[SlideType::Cover]);
        let output = enforce_count(input, 20, &ContentAnalysis::default(), "no");

        assert_eq!(output.len(), 20);
        let titles: HashSet<_> = output.slides.iter().map(|s| s.title.to_lowercase()).collect();
        assert_eq!(titles.len(), 20);
        assert!(titles.contains("bakgrunn (b)"));
    }

    #[test]
    fn exact_count_after_composition() {
        let analysis = ContentAnalysis::default();
        let options = ComposeOptions::default();
        for content in 0..10 {
            for target in 4..16 {
                let slides = (0..content)
                    .map(|i| OutlineSlide::new(format!("Topic {i}"), SlideType::Bullets))
                    .collect();
                let composed = compose(Outline::new("Deck", slides), &options);
                let output = enforce_count(composed, target, &analysis, "en");
                assert_eq!(output.len(), target, "content={content} target={target}");
            }
        }
    }
}
