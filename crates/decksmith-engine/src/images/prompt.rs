//! Image prompt construction.

use std::collections::HashSet;

use decksmith_core::analysis::ContentAnalysis;
use decksmith_core::block::Block;
use decksmith_core::request::ImageStyle;
use decksmith_core::slide::Slide;

use crate::locale;

/// Keywords appended to a prompt.
const MAX_KEYWORDS: usize = 5;

/// Shortest title word used as a keyword.
const MIN_KEYWORD_CHARS: usize = 4;

/// Appended to every prompt; rendered text in images is never legible.
pub const NO_TEXT: &str = "No text, letters, words, labels or numbers in the image.";

/// Subject line of the slide: its title, or the first visible text.
fn subject(slide: &Slide) -> String {
    if let Some(title) = slide.title() {
        return title.to_string();
    }
    slide
        .blocks
        .iter()
        .find_map(|block| match block {
            Block::Callout { text, .. } | Block::Text { text } => Some(text.clone()),
            Block::Image { alt, .. } if !alt.is_empty() => Some(alt.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Picks visual keywords from the slide title, then from the analysis.
pub fn keywords(slide: &Slide, analysis: &ContentAnalysis) -> Vec<String> {
    let title_words = subject(slide)
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|word| {
            word.chars().filter(|c| c.is_alphabetic()).count() >= MIN_KEYWORD_CHARS
                && !locale::is_stop_word(word)
        })
        .map(str::to_string)
        .collect::<Vec<_>>();

    let candidates = title_words
        .into_iter()
        .chain(analysis.statistics.iter().map(|s| s.label.clone()))
        .chain(analysis.features.iter().map(|f| f.title.clone()))
        .chain(analysis.topics.iter().cloned())
        .chain(analysis.sequential_steps.first().cloned());

    let mut seen = HashSet::new();
    candidates
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty() && seen.insert(keyword.to_lowercase()))
        .take(MAX_KEYWORDS)
        .collect()
}

/// Builds the image prompt for a slide.
pub fn build_prompt(slide: &Slide, analysis: &ContentAnalysis, style: ImageStyle) -> String {
    let subject = subject(slide);
    let mut prompt = String::new();
    if !subject.is_empty() {
        prompt.push_str(subject.trim_end_matches(['.', '!', '?', ':']));
        prompt.push_str(". ");
    }
    prompt.push_str(style.directive());
    prompt.push_str(". ");

    let keywords = keywords(slide, analysis);
    if !keywords.is_empty() {
        prompt.push_str("Key elements: ");
        prompt.push_str(&keywords.join(", "));
        prompt.push_str(". ");
    }

    prompt.push_str(NO_TEXT);
    prompt
}

#[cfg(test)]
mod tests {
    use decksmith_core::analysis::{Feature, Statistic};
    use decksmith_core::slide::SlideType;

    use super::*;

    fn slide(title: &str) -> Slide {
        Slide::new(
            SlideType::TextPlusImage,
            vec![Block::title(title), Block::placeholder_image(title)],
        )
    }

    #[test]
    fn prompt_has_subject_style_and_no_text_rule() {
        let prompt = build_prompt(
            &slide("Solar rollout in the north"),
            &ContentAnalysis::default(),
            ImageStyle::Minimal,
        );

        assert!(prompt.starts_with("Solar rollout in the north. Minimalist composition"));
        assert!(prompt.contains("Key elements: Solar, rollout, north."));
        assert!(prompt.ends_with(NO_TEXT));
    }

    #[test]
    fn keywords_are_unique_and_capped() {
        let analysis = ContentAnalysis {
            statistics: vec![Statistic {
                value: "40%".into(),
                label: "solar share".into(),
            }],
            features: vec![
                Feature {
                    title: "Battery storage".into(),
                    description: "Grid buffering".into(),
                },
                Feature {
                    title: "SOLAR".into(),
                    description: "Duplicate of the title".into(),
                },
            ],
            topics: vec!["Permits".into(), "Funding".into(), "Staffing".into()],
            ..ContentAnalysis::default()
        };

        let keywords = keywords(&slide("Solar rollout"), &analysis);
        assert_eq!(
            keywords,
            ["Solar", "rollout", "solar share", "Battery storage", "Permits"]
        );
    }

    #[test]
    fn quotes_use_their_text_as_subject() {
        let quote = Slide::new(
            SlideType::QuoteCallout,
            vec![Block::Callout {
                text: "Customers come first".into(),
                attribution: None,
            }],
        );
        let prompt = build_prompt(&quote, &ContentAnalysis::default(), ImageStyle::Abstract);
        assert!(prompt.starts_with("Customers come first. Abstract composition"));
    }
}
